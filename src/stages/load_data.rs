//! "Load Data" stage

use super::StageContext;
use crate::error::Result;
use crate::utils::{DatasetLoader, ALLOWED_EXTENSIONS};
use tracing::warn;

pub(crate) fn upload_data(ctx: &mut StageContext<'_>) -> Result<()> {
    ctx.surface.subheader("Select Data Source");

    let upload = ctx
        .surface
        .file_upload("Upload a CSV or DATA file", &ALLOWED_EXTENSIONS)?;

    let header_present = ctx
        .surface
        .checkbox("First row contains column names", ctx.session.header_present())?;
    ctx.session.set_header_present(header_present);

    let Some(upload) = upload else {
        ctx.surface.info("Please upload a file to proceed.");
        return Ok(());
    };

    // Previous dataset stays in place on any failure
    match DatasetLoader::new().load_upload(&upload, header_present) {
        Ok(dataset) => {
            ctx.surface
                .info(&format!("Auto-detected separator: {}", dataset.separator()));
            ctx.surface.success("File loaded successfully.");
            ctx.surface.table(&dataset.preview(ctx.config.preview_rows));
            ctx.session.replace_dataset(dataset);
        }
        Err(e) => {
            warn!(file = %upload.name, error = %e, "Upload rejected");
            ctx.surface.error(&format!("Error loading file: {e}"));
        }
    }

    Ok(())
}
