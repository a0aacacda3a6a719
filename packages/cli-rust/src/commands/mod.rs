//! CLI command implementations
//!
//! Each command loads the host registry for the resolved config file and
//! either reads from it or drives its write path.

mod add;
mod completion;
mod connect;
mod edit;
mod info;
mod list;
mod remove;

pub use add::{AddArgs, cmd_add};
pub use completion::{CompleteHostsArgs, CompletionArgs, cmd_complete_hosts, cmd_completion};
pub use connect::{ConnectArgs, cmd_connect};
pub use edit::{EditArgs, cmd_edit};
pub use info::{InfoArgs, cmd_info};
pub use list::{ListArgs, cmd_list};
pub use remove::{RemoveArgs, cmd_remove};
