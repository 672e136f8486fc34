//! ブラウザセッション（起動・UA設定・リクエスト遮断）

mod browser;
mod policy;

pub use browser::{BrowserSession, USER_AGENT};
pub use policy::{RequestPolicy, ResourceKind};
