//! sshm - SSH Manager
//!
//! Entry point for the `sshm` binary.

fn main() -> anyhow::Result<()> {
    sshm::run()
}
