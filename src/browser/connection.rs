use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, BrowserError};

/// 连接到已运行的浏览器并获取页面
///
/// 整个运行只占用一个页面：找到或新建一个，之后所有受访者复用它。
pub async fn connect_to_browser_and_page(
    port: u16,
    target_url: Option<&str>,
) -> Result<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

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

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    // 复用第一个已有页面，否则新建
    let page = if let Some(existing) = pages.into_iter().next() {
        existing
    } else {
        browser.new_page("about:blank").await.map_err(|e| {
            error!("创建空白页面失败: {}", e);
            AppError::Browser(BrowserError::PageCreationFailed { source: Box::new(e) })
        })?
    };

    if let Some(url) = target_url {
        page.goto(url).await.map_err(|e| {
            error!("导航到 {} 失败: {}", url, e);
            AppError::navigation_failed(url, e)
        })?;
        info!("已导航到: {}", url);
    }

    Ok((browser, page))
}
