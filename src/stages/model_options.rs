//! "Model Options" stage

use super::StageContext;
use crate::autopipeline::{ModelOrchestrator, ProblemType, ProblemTypeDetector};
use crate::error::Result;

const CONFIGURATION_NOTE: &str = "This is a placeholder for future model configurations. \
Additional options like dropping columns, transforming features, handling missing values, \
and other advanced settings will be introduced in upcoming versions.";

pub(crate) fn configure_model(ctx: &mut StageContext<'_>) -> Result<()> {
    ctx.surface.subheader("Model Configuration Options");
    ctx.surface.info(CONFIGURATION_NOTE);

    let Some(dataset) = ctx.session.dataset() else {
        ctx.surface
            .warning("No dataset loaded. Please upload data first in 'Load Data' section.");
        return Ok(());
    };
    let frame = dataset.frame().clone();
    let columns = dataset.column_names();

    let current = ctx
        .session
        .target_column()
        .and_then(|t| columns.iter().position(|c| c == t))
        .unwrap_or(0);
    let choice = ctx
        .surface
        .select("Select the target column for your model:", &columns, current)?;
    let Some(target) = columns.get(choice).cloned() else {
        ctx.surface.error("Selected target column does not exist.");
        return Ok(());
    };

    if let Err(e) = ctx.session.set_target_column(&target) {
        ctx.surface.error(&e.to_string());
        return Ok(());
    }

    let problem_type = match ProblemTypeDetector::new().infer(&frame, &target) {
        Ok(problem_type) => problem_type,
        Err(e) => {
            ctx.surface.error(&e.to_string());
            return Ok(());
        }
    };
    ctx.session.set_problem_type(problem_type);
    ctx.surface
        .info(&format!("Detected problem type: {problem_type}"));

    if !ctx.surface.button("Generate Best Model")? {
        return Ok(());
    }

    if problem_type == ProblemType::Unknown {
        ctx.surface.error("Unknown problem type. Cannot generate model.");
        return Ok(());
    }

    ctx.surface.spinner_start("Training models... this may take a while");
    let result = ModelOrchestrator::new(ctx.engine)
        .with_seed(ctx.config.search.seed)
        .train(&frame, &target, problem_type);
    ctx.surface.spinner_stop();

    match result {
        Ok(result) => {
            let description = result.model.description().clone();
            ctx.session.store_training(result);
            ctx.surface.success("Best model generated successfully.");
            ctx.surface.json(&description);
        }
        Err(e) => ctx.surface.error(&e.to_string()),
    }

    Ok(())
}
