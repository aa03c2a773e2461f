use crate::infra::{build_stack, seed_directory, Stack};
use clap::Args;
use workbroker::error::AppError;
use workbroker::marketplace::{
    ActorId, ActorKind, ActorRef, CompletionOutcome, IntentStatus, PaymentMode, WorkItemDetail,
    WorkItemDraft,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the online-settlement portion of the demo.
    #[arg(long)]
    pub(crate) skip_online: bool,
}

const OWNER: &str = "cust-1";
const PROVIDER: &str = "pro-1";

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let stack = build_stack();
    seed_directory(&stack.directory);

    println!("Engagement broker demo");
    run_cash_scenario(&stack)?;
    if !args.skip_online {
        run_online_scenario(&stack)?;
    }

    Ok(())
}

fn run_cash_scenario(stack: &Stack) -> Result<(), AppError> {
    println!("\nCash-on-delivery path");

    let item = stack.items.post(
        ActorRef::new(ActorKind::Requester, OWNER),
        WorkItemDraft {
            title: "Repaint the garage door".to_string(),
            payment_mode: PaymentMode::CashOnDelivery,
            detail: WorkItemDetail::Job {
                description: "Single door, paint supplied.".to_string(),
                category: "painting".to_string(),
                location: Some("Iowa City".to_string()),
            },
        },
    )?;
    println!("  Posted {} ({})", item.id.0, item.title);

    let application = stack.applications.submit(&item.id, &actor(PROVIDER))?;
    println!(
        "  {} applied ({})",
        application.profile.display_name, application.id.0
    );

    let engagement = stack.applications.accept(&application.id, &actor(OWNER))?;
    println!(
        "  Accepted into engagement {} [{}]",
        engagement.id.0,
        engagement.status.label()
    );

    match stack
        .engagements
        .complete(&engagement.id, &actor(OWNER), 9_500, None)?
    {
        CompletionOutcome::Settled { engagement } => {
            println!("  Settled synchronously [{}]", engagement.status.label());
        }
        CompletionOutcome::AwaitingConfirmation { .. } => {
            println!("  Unexpected continuation for a cash engagement");
        }
    }

    let score = stack.engagements.rate(&engagement.id, &actor(OWNER), 5)?;
    println!("  Rated 5, provider score now {score}");

    Ok(())
}

fn run_online_scenario(stack: &Stack) -> Result<(), AppError> {
    println!("\nOnline-settlement path");

    let item = stack.items.post(
        ActorRef::new(ActorKind::Requester, OWNER),
        WorkItemDraft {
            title: "Mount a wall television".to_string(),
            payment_mode: PaymentMode::Online,
            detail: WorkItemDetail::Job {
                description: "65 inch set, brick wall.".to_string(),
                category: "handyman".to_string(),
                location: None,
            },
        },
    )?;
    println!("  Posted {} ({})", item.id.0, item.title);

    let application = stack.applications.submit(&item.id, &actor(PROVIDER))?;
    let engagement = stack.applications.accept(&application.id, &actor(OWNER))?;
    println!("  Accepted into engagement {}", engagement.id.0);

    let continuation = match stack
        .engagements
        .complete(&engagement.id, &actor(OWNER), 15_000, Some("card"))?
    {
        CompletionOutcome::AwaitingConfirmation { continuation, .. } => continuation,
        CompletionOutcome::Settled { .. } => {
            println!("  Unexpected synchronous settlement for an online engagement");
            return Ok(());
        }
    };
    println!(
        "  Payment intent {} opened, awaiting confirmation",
        continuation.payment_intent_id
    );

    // Stand in for the provider-side settlement the webhook would report.
    stack
        .gateway
        .set_status(&continuation.payment_intent_id, IntentStatus::Succeeded);

    let confirmed = stack
        .engagements
        .confirm_payment(&engagement.id, &continuation.payment_intent_id)?;
    println!("  Confirmed [{}]", confirmed.status.label());

    let score = stack.engagements.rate(&engagement.id, &actor(OWNER), 4)?;
    println!("  Rated 4, provider score now {score}");

    Ok(())
}

fn actor(id: &str) -> ActorId {
    ActorId(id.to_string())
}
