//! Function tools executed by this process on behalf of the agent.

mod account;

pub use account::{
    AccountToolkit, Directory, OrgInfo, OrgInfoTool, UserInfo, UserInfoTool,
};
