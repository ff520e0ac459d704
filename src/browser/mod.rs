//! 浏览器接入
//!
//! 两种接入方式：连接已运行实例（调试端口）或自行启动无头实例。

pub mod connection;
pub mod headless;

pub use connection::connect_to_browser_and_page;
pub use headless::launch_headless_browser;
