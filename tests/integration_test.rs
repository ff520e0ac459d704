use survey_auto_submit::models::section_plan;
use survey_auto_submit::{
    connect_to_browser_and_page, launch_headless_browser, load_respondents, process_respondent,
    AdvanceControl, AnswerResolver, CarouselDriver, CompletionDetector, Config, JsExecutor,
    Respondent, RunLogger, RunOutcome, Section, SectionKind, SectionRouter, TraversalCtx,
};

/// 构造自包含的 data: 夹具页
fn fixture_url(body: &str) -> String {
    format!(
        "data:text/html;charset=utf-8,<html><body>{}</body></html>",
        body
    )
}

fn fixture_respondent(id: u64, answers: &[(&str, &str)]) -> Respondent {
    Respondent {
        id,
        profile: "dyrektor".to_string(),
        answers: answers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_full_batch_run() {
    // 初始化日志
    survey_auto_submit::logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行完整批次（需要可达的目标问卷）
    let app = survey_auto_submit::App::initialize(config)
        .await
        .expect("初始化应用失败");
    app.run().await.expect("批次运行失败");
}

#[tokio::test]
#[ignore]
async fn test_browser_connection() {
    survey_auto_submit::logger::init();

    let config = Config::from_env();

    let result =
        connect_to_browser_and_page(config.browser_debug_port, Some(&config.target_url)).await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}

#[tokio::test]
#[ignore]
async fn test_resolver_against_live_consent_page() {
    survey_auto_submit::logger::init();

    let config = Config::from_env();
    let (_browser, page) = launch_headless_browser(
        &config.target_url,
        config.viewport_width,
        config.viewport_height,
    )
    .await
    .expect("启动无头浏览器失败");

    let exec = JsExecutor::new(page);
    let resolver = AnswerResolver::new(&config);

    // 同意页上应用 "TAK" 应命中策略链前两条之一
    let attempt = resolver.apply(&exec, "TAK").await;
    assert!(attempt.is_some(), "同意页上应能应用 TAK");

    let run_logger = RunLogger::new(&config.artifacts_dir, &config.run_summary_file);
    run_logger.screenshot(&exec, 0, "consent-live").await;
}

#[tokio::test]
#[ignore]
async fn test_carousel_stops_when_advance_becomes_disabled() {
    survey_auto_submit::logger::init();

    let mut config = Config::default();
    config.settle_delay_ms = 100;
    config.step_timeout_ms = 1500;

    let (_browser, page) =
        launch_headless_browser("about:blank", config.viewport_width, config.viewport_height)
            .await
            .expect("启动无头浏览器失败");
    let exec = JsExecutor::new(page);

    // 第二次推进后控件被禁用，第三张卡片应提前终止
    let url = fixture_url(
        "<script>window.__clicks=0;</script>\
         <h2>Pytanie</h2>\
         <label for='q1'>TAK</label><input type='radio' id='q1'>\
         <button id='NextButton' onclick='if(++window.__clicks>=2)this.disabled=true;'>Dalej</button>",
    );
    exec.goto(&url).await.expect("导航到夹具页失败");

    let resolver = AnswerResolver::new(&config);
    let advance = AdvanceControl::new(&config);
    let driver = CarouselDriver::new(&config);

    let respondent = fixture_respondent(21, &[("1", "TAK"), ("2", "TAK"), ("3", "TAK")]);
    let mut ctx = TraversalCtx::new(&respondent, 1);
    let section = Section {
        kind: SectionKind::Carousel,
        label: "carousel-fixture",
        question_count: 3,
        expected_card_count: Some(3),
    };

    let outcome = driver
        .run(
            &exec,
            &resolver,
            &advance,
            &mut ctx,
            &section,
            &respondent.answers,
        )
        .await;

    assert!(!outcome.completed, "推进被禁用后不应标记完成");
    assert_eq!(outcome.cards_processed, 3, "提前终止时当前卡片计入已处理");
    assert_eq!(outcome.cards.len(), 3);
    // 第二张卡起单选已处于目标状态，幂等路径记为同一策略命中
    assert_eq!(
        outcome.cards[1].strategy.as_deref(),
        Some("exact-label-bound-input")
    );
}

#[tokio::test]
#[ignore]
async fn test_free_text_fill_on_fixture_page() {
    survey_auto_submit::logger::init();

    let mut config = Config::default();
    config.step_timeout_ms = 500;

    let (_browser, page) =
        launch_headless_browser("about:blank", config.viewport_width, config.viewport_height)
            .await
            .expect("启动无头浏览器失败");
    let exec = JsExecutor::new(page);

    exec.goto(&fixture_url(
        "<label>Wiek</label><input type='text' id='age'>",
    ))
    .await
    .expect("导航到夹具页失败");

    let resolver = AnswerResolver::new(&config);
    let attempt = resolver
        .apply(&exec, "45")
        .await
        .expect("无标签匹配时应落到自由文本策略");
    assert_eq!(attempt.strategy_name, "free-text-fill");

    let value: String = exec
        .eval_as("document.getElementById('age').value")
        .await
        .expect("读取输入值失败");
    assert_eq!(value, "45");
}

#[tokio::test]
#[ignore]
async fn test_early_terminal_leaves_no_html_snapshot() {
    survey_auto_submit::logger::init();

    let dir = std::env::temp_dir().join(format!("survey_submit_early_{}", std::process::id()));
    let summary = dir.join("run_summary.txt");

    let mut config = Config::default();
    config.settle_delay_ms = 100;
    config.step_timeout_ms = 1500;

    let (_browser, page) =
        launch_headless_browser("about:blank", config.viewport_width, config.viewport_height)
            .await
            .expect("启动无头浏览器失败");
    let exec = JsExecutor::new(page);

    // 同意页可正常作答推进，页面同时带着视觉隐藏的完成标记
    let url = fixture_url(
        "<label for='c1'>TAK</label><input type='radio' id='c1'>\
         <button id='NextButton'>Dalej</button>\
         <div style='display:none'>Dziękujemy za wypełnienie ankiety</div>",
    );
    exec.goto(&url).await.expect("导航到夹具页失败");

    let resolver = AnswerResolver::new(&config);
    let advance = AdvanceControl::new(&config);
    let carousel = CarouselDriver::new(&config);
    let detector = CompletionDetector::new(&config);
    let run_logger = RunLogger::new(dir.to_str().unwrap(), summary.to_str().unwrap());

    let respondent = fixture_respondent(31, &[("1", "TAK")]);
    let mut ctx = TraversalCtx::new(&respondent, 1);
    let router = SectionRouter::new(
        &config,
        &resolver,
        &advance,
        &carousel,
        &detector,
        &run_logger,
    );

    let entry = router.traverse(&exec, &respondent, &mut ctx).await;

    assert!(entry.completed, "隐藏完成标记也应命中");
    assert!(entry.early_terminal, "完成页之前命中应记为提前终局");
    assert!(matches!(entry.run_outcome(), RunOutcome::CompletedEarly));

    // 确认完成的终局不产出失败诊断快照
    let snapshots: Vec<_> = std::fs::read_dir(dir.join("pages")).unwrap().collect();
    assert!(snapshots.is_empty(), "成功终局不应留下 HTML 快照");

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
#[ignore]
async fn test_navigation_failure_still_persists_respondent_log() {
    survey_auto_submit::logger::init();

    let dir = std::env::temp_dir().join(format!("survey_submit_navfail_{}", std::process::id()));
    let summary = dir.join("run_summary.txt");

    let mut config = Config::default();
    config.target_url = "definitely-not-a-url".to_string();

    let (_browser, page) =
        launch_headless_browser("about:blank", config.viewport_width, config.viewport_height)
            .await
            .expect("启动无头浏览器失败");
    let exec = JsExecutor::new(page);

    let resolver = AnswerResolver::new(&config);
    let advance = AdvanceControl::new(&config);
    let carousel = CarouselDriver::new(&config);
    let detector = CompletionDetector::new(&config);
    let run_logger = RunLogger::new(dir.to_str().unwrap(), summary.to_str().unwrap());
    run_logger.init_summary();

    let respondent = fixture_respondent(41, &[("1", "TAK")]);

    let outcome = process_respondent(
        &exec,
        &respondent,
        1,
        1,
        &config,
        &resolver,
        &advance,
        &carousel,
        &detector,
        &run_logger,
    )
    .await;

    assert!(matches!(outcome, RunOutcome::Aborted));

    // 一位受访者一份结构化日志，导航失败也不例外
    let log = std::fs::read_to_string(dir.join("logs/respondent_41.json"))
        .expect("导航失败也应落盘结构化日志");
    let parsed: serde_json::Value = serde_json::from_str(&log).unwrap();
    assert_eq!(parsed["completed"], false);
    assert!(parsed["steps"].as_array().unwrap().is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_load_respondents_and_plan_capacity() {
    // 不需要浏览器：校验加载器与分区序列的容量关系
    let dir = std::env::temp_dir().join(format!("survey_submit_it_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("respondents.json");
    std::fs::write(
        &path,
        r#"{ "respondents": [
            { "id": 1, "profile": "dyrektor",
              "answers": { "2": "Kobieta", "1": "TAK", "3": "45" } }
        ] }"#,
    )
    .unwrap();

    let respondents = load_respondents(path.to_str().unwrap())
        .await
        .expect("应该能够加载受访者文件");
    assert_eq!(respondents.len(), 1);
    assert_eq!(respondents[0].answers[0].0, "1");

    // 分区序列的总题量覆盖三个轮播与表单分区
    let config = Config::default();
    let plan = section_plan(&config);
    let capacity: usize = plan.iter().map(|s| s.question_count).sum();
    assert_eq!(
        capacity,
        1 + config.demographics_question_count
            + 5
            + config.leadership_question_count
            + 18
            + 24
    );

    let _ = std::fs::remove_dir_all(&dir);
}
