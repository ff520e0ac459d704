use std::path::Path;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, BrowserError};

/// 启动无头浏览器并导航到指定 URL
///
/// 视口尺寸来自配置；`CHROME_PATH` 环境变量可指定浏览器可执行文件。
pub async fn launch_headless_browser(
    url: &str,
    viewport_width: u32,
    viewport_height: u32,
) -> Result<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");
    debug!("目标 URL: {}, 视口: {}x{}", url, viewport_width, viewport_height);

    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .window_size(viewport_width, viewport_height)
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--remote-debugging-port=0",
        ]);

    if let Ok(chrome_path) = std::env::var("CHROME_PATH") {
        builder = builder.chrome_executable(Path::new(&chrome_path));
    }

    let config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        anyhow::anyhow!("配置无头浏览器失败: {}", e)
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        AppError::Browser(BrowserError::LaunchFailed { source: Box::new(e) })
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page(url).await.map_err(|e| {
        error!("创建页面失败: {}", e);
        AppError::Browser(BrowserError::PageCreationFailed { source: Box::new(e) })
    })?;

    info!("✅ 无头浏览器已导航到: {}", url);

    Ok((browser, page))
}
