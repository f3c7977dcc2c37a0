//! "Model Summary" stage

use super::StageContext;
use crate::autopipeline::{
    ResultsPresenter, SectionOutcome, FEATURE_IMPORTANCE_SECTION, LEADERBOARD_SECTION, PREDICTIONS_SECTION,
};
use crate::error::Result;
use crate::surface::InteractionSurface;

const SUMMARY_NOTE: &str = "This is a placeholder for the model summary. \
A written description of the model is not generated in this version.";

pub(crate) fn show_summary(ctx: &mut StageContext<'_>) -> Result<()> {
    ctx.surface.subheader("Model Summary");

    let Some(model) = ctx.session.model().cloned() else {
        ctx.surface
            .warning("No model generated. Please train a model in 'Model Options' section.");
        return Ok(());
    };

    if ctx.surface.button("Show Model Results")? {
        ctx.session.request_results();
    }
    if !ctx.session.results_requested() {
        return Ok(());
    }

    let Some(dataset) = ctx.session.dataset() else {
        ctx.surface.warning("No dataset loaded. Please upload data first in 'Load Data' section.");
        return Ok(());
    };

    let report = ResultsPresenter::new(ctx.engine)
        .with_prediction_rows(ctx.config.prediction_rows)
        .present(&model, dataset.frame(), ctx.session.leaderboard());

    ctx.surface.subheader(FEATURE_IMPORTANCE_SECTION);
    render(ctx.surface, &report.feature_importance, |s, plot| s.image(plot));

    ctx.surface.subheader(LEADERBOARD_SECTION);
    render(ctx.surface, &report.leaderboard, |s, frame| s.table(frame));

    ctx.surface.subheader(PREDICTIONS_SECTION);
    render(ctx.surface, &report.predictions, |s, frame| s.table(frame));

    ctx.surface.subheader("Summary");
    ctx.surface.info(SUMMARY_NOTE);

    Ok(())
}

fn render<T>(
    surface: &mut dyn InteractionSurface,
    outcome: &SectionOutcome<T>,
    show: impl FnOnce(&mut dyn InteractionSurface, &T),
) {
    match outcome {
        SectionOutcome::Ready(value) => show(surface, value),
        SectionOutcome::Warning(message) => surface.warning(message),
        SectionOutcome::Failed(err) => surface.error(&err.to_string()),
    }
}
