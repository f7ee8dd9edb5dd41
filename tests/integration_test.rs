//! Integration tests for MaBaba
//!
//! These tests verify the integration between the workspace crates:
//! - mababa-llm: retry policy and the scripted provider
//! - mababa-tools: builtin tool registration
//! - mababa-core: routing, orchestration, report rendering and sessions

use std::sync::Arc;

use mababa_core::artifacts::{parse_product_tables, render_product_tables};
use mababa_core::{
    format_error_for_cli, AgentCatalog, Artifact, Error, ErrorKind, ModelSettings, Orchestrator,
    OrchestratorConfig, ProductPolicy, Runner, SectionOutcome, IDENTITY_RESPONSE,
};
use mababa_llm::{MockProvider, RetryPolicy, ScriptedReply};
use mababa_tools::{register_builtins, SearchConfig, ToolRegistry};
use tokio_test::assert_ok;

fn orchestrator(mock: &Arc<MockProvider>) -> Orchestrator {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry, &SearchConfig::default());
    let catalog =
        AgentCatalog::builtin(&ModelSettings::default(), &ProductPolicy::default()).unwrap();
    Orchestrator::new(
        mock.clone(),
        Arc::new(registry),
        catalog,
        OrchestratorConfig::default(),
    )
    .unwrap()
}

const NEWMOM_JSON: &str = r#"```json
[
  {"product_name": "Bravado Body Silk Nursing Bra", "brand": "Bravado", "category": "Nursing",
   "rating": 4.5, "price": "$58.00", "vendor": "Target",
   "purchase_link": "https://www.target.com/p/bravado-body-silk", "description": "Seamless"},
  {"product_name": "Lansinoh Lanolin Nipple Cream", "brand": "Lansinoh", "category": "Nursing",
   "rating": 4.8, "price": "$9.99", "vendor": "walmart.com",
   "purchase_link": "https://www.walmart.com/ip/lansinoh", "description": "Soothing"}
]
```"#;

// ============================================================================
// Policy and Tool Registration
// ============================================================================

#[test]
fn test_default_retry_policy_delays() {
    let policy = RetryPolicy::default();
    let delays: Vec<u64> = (1..policy.max_attempts)
        .map(|n| policy.delay(n).as_secs())
        .collect();
    assert_eq!(delays, vec![1, 7, 49, 343]);
}

#[test]
fn test_tool_registry_with_builtins() {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry, &SearchConfig::default());

    assert_eq!(registry.list_names(), vec!["web_search"]);
    let defs = registry.definitions_for(&["web_search"][..]);
    assert_eq!(defs.len(), 1);
    assert!(!defs[0].parameters.is_null());
}

#[test]
fn test_every_builtin_agent_can_reach_its_tools() {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry, &SearchConfig::default());
    let catalog =
        AgentCatalog::builtin(&ModelSettings::default(), &ProductPolicy::default()).unwrap();

    for agent in catalog.iter() {
        for tool in &agent.tools {
            assert!(registry.has(tool), "{} needs {}", agent.name, tool);
        }
    }
}

// ============================================================================
// Full Pipeline
// ============================================================================

#[tokio::test]
async fn test_mother_shopping_pipeline() {
    let mock = Arc::new(
        MockProvider::new()
            .with_reply_for("for an expecting or new mother", ScriptedReply::text(NEWMOM_JSON)),
    );
    let orch = orchestrator(&mock);

    let response = assert_ok!(
        orch.respond("I need a nursing bra and nipple cream for myself", &[])
            .await
    );

    // The agent was offered the search tool under the shared model settings
    let seen = mock.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].tools, vec!["web_search".to_string()]);
    assert_eq!(seen[0].model, "gemini-2.5-flash-lite");

    match response.report.outcome("newmom_products") {
        Some(SectionOutcome::Artifact {
            artifact: Artifact::Products(collection),
        }) => assert_eq!(collection.records.len(), 2),
        other => panic!("unexpected outcome: {other:?}"),
    }

    // The rendered tables read back to the same rows
    let rows = parse_product_tables(&response.text);
    let names: Vec<&str> = rows.iter().map(|r| r.product_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Bravado Body Silk Nursing Bra", "Lansinoh Lanolin Nipple Cream"]
    );
    assert!(rows.iter().all(|r| r.category == "Nursing"));
}

#[tokio::test]
async fn test_report_json_shape() {
    let mock = Arc::new(
        MockProvider::new()
            .with_reply_for("for an expecting or new mother", ScriptedReply::text(NEWMOM_JSON)),
    );
    let orch = orchestrator(&mock);

    let response = orch
        .respond("What is your name? I need a nursing bra", &[])
        .await
        .unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["report"]["greeting"], IDENTITY_RESPONSE);
    assert_eq!(json["report"]["sections"][0]["output_key"], "newmom_products");
    assert_eq!(json["report"]["sections"][0]["status"], "artifact");
    assert_eq!(
        json["decision"]["intents"],
        serde_json::json!(["mother_products", "identity"])
    );
}

#[tokio::test]
async fn test_runner_session_across_turns() {
    let mock = Arc::new(
        MockProvider::new()
            .with_reply_for(
                "educational resources",
                ScriptedReply::text("## Classes\nLamaze at your hospital."),
            )
            .with_reply_for(
                "educational resources",
                ScriptedReply::text("## Apps\nBaby Connect."),
            ),
    );
    let runner = Runner::new(Arc::new(orchestrator(&mock)));
    let mut session = runner.new_session();

    runner
        .run(&mut session, "Suggest some prenatal classes")
        .await
        .unwrap();
    let second = runner
        .run(&mut session, "Any good apps for tracking feeds?")
        .await
        .unwrap();

    assert!(second.text.contains("Baby Connect"));
    assert_eq!(session.turns.len(), 2);
    // Second call carries the first turn as history
    assert_eq!(mock.requests()[1].message_count, 4);
}

#[tokio::test]
async fn test_product_table_round_trip_from_policy_checked_output() {
    let collection = mababa_core::ProductCollection::parse(
        "newmom_products",
        NEWMOM_JSON,
        &["Nursing".to_string()],
    )
    .unwrap();
    assert!(collection.violations(&ProductPolicy::default()).is_empty());

    let parsed = parse_product_tables(&render_product_tables(&collection));
    assert_eq!(parsed.len(), collection.records.len());
    for (a, b) in parsed.iter().zip(&collection.records) {
        assert_eq!(a.product_name, b.product_name);
        assert_eq!(a.rating, b.rating);
        assert_eq!(a.purchase_link, b.purchase_link);
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_cli_error_formatting() {
    let error = Error::from(mababa_llm::Error::NotConfigured("no API key".into()));
    assert_eq!(error.kind(), ErrorKind::Credential);

    let output = format_error_for_cli(&error);
    assert!(output.contains("GOOGLE_API_KEY"));
    assert!(output.contains("More info"));
}
