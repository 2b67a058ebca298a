use serde_json::json;
use toolflow::{EngineBuilder, FlowError, WorkflowModel};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolflow=info,warn")))
        .init();

    let engine = EngineBuilder::new()
        .tool_fn("outline", |params, _| {
            let task = params.get("task").and_then(|t| t.as_str()).unwrap_or("untitled");
            Ok(json!({
                "title": task,
                "slides": [
                    {"heading": "Background", "bullets": ["why", "what"]},
                    {"heading": "Plan", "bullets": ["steps", "risks"]}
                ]
            }))
        })
        .tool_async_fn("generate_image", |params, _| async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            let size = params.get("size").cloned().unwrap_or(json!("512x512"));
            Ok(json!({"image_path": "artifacts/images/cover.png", "size": size}))
        })
        .tool_fn("render_pptx", |params, ctx| {
            let slides = params.get("slides").and_then(|s| s.as_array()).map(Vec::len).unwrap_or(0);
            Ok(json!({
                "pptx_path": "artifacts/slides/deck.pptx",
                "title": params.get("title"),
                "cover": params.get("image_path"),
                "slides": slides,
                "task": ctx.input().get("task"),
            }))
        })
        .build()
        .unwrap();

    let text = include_str!("./workflow.json");
    let workflow_model = WorkflowModel::from_json(text).unwrap();

    println!("Execution order: {:?}", engine.validate(&workflow_model).unwrap());

    match engine.run(&workflow_model, json!({"task": "Quarterly review"})).await {
        Ok(run) => {
            println!("Workflow completed, trace: {}", run.location);
            println!("Results: {:#?}", run.results);
        }
        Err(FlowError::NodeFailed {
            trace_id,
            node,
            error,
            ..
        }) => {
            println!("Workflow failed at node {}: {} (trace {})", node, error, trace_id);
        }
        Err(e) => {
            println!("Workflow rejected: {}", e);
        }
    }
}
