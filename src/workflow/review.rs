//! Review and revision steps.
use super::{with_workflow, AppContext};
use crate::cli::{ReviewArgs, ReviseArgs};
use crate::generator::UnavailableGenerator;
use crate::record::GeneratedPlan;
use anyhow::Result;

pub fn run_review(ctx: &AppContext, args: ReviewArgs) -> Result<()> {
    let generator = UnavailableGenerator::new("reviews do not generate");
    with_workflow(ctx, &generator, |workflow| {
        let event = workflow.submit_review(
            &args.id,
            args.role,
            args.action,
            args.reviewer.clone(),
            &args.comments,
        )?;
        println!("{}", event.id);
        match workflow.list(None).iter().find(|record| record.id == args.id) {
            Some(record) => {
                eprintln!(
                    "{} {} {}: now {} (v{})",
                    args.role, args.action, args.id, record.status, record.version
                );
                if record.status.is_terminal() {
                    eprintln!("next: planrev summarize --id {}", record.id);
                }
            }
            None => eprintln!("review logged; no recommendation with id {}", args.id),
        }
        Ok(())
    })
}

pub fn run_revise(ctx: &AppContext, args: ReviseArgs) -> Result<()> {
    let generator = ctx.require_generator(args.lm.as_deref())?;
    with_workflow(ctx, generator.as_ref(), |workflow| {
        let record = workflow.request_ai_revision(&args.id, &args.comments)?;
        println!("{}", record.id);
        if let GeneratedPlan::Degraded { error, .. } = &record.recommendations {
            eprintln!("revision stored as degraded output: {error}");
        }
        eprintln!("{}: now {} (v{})", record.id, record.status, record.version);
        Ok(())
    })
}
