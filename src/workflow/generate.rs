//! Generate step: one recommendation per logged prediction.
use super::{with_workflow, AppContext};
use crate::cli::GenerateArgs;
use anyhow::Result;

pub fn run_generate(ctx: &AppContext, args: GenerateArgs) -> Result<()> {
    let entries = ctx.prediction_log().load();
    if entries.is_empty() {
        eprintln!(
            "no predictions in {}; run `planrev predict` first",
            ctx.paths.prediction_log_path().display()
        );
        return Ok(());
    }
    let generator = ctx.require_generator(args.lm.as_deref())?;
    with_workflow(ctx, generator.as_ref(), |workflow| {
        let records = workflow.generate_all(&entries);
        workflow.store_generated(&records, args.append)?;
        let degraded = records
            .iter()
            .filter(|record| record.recommendations.is_degraded())
            .count();
        for record in &records {
            println!("{}  {}", record.id, record.model);
        }
        eprintln!(
            "wrote {} recommendations ({} degraded) to {}",
            records.len(),
            degraded,
            ctx.paths.recommendations_path().display()
        );
        Ok(())
    })
}
