use clap::{Args, Subcommand};

use crate::context::AppContext;
use crate::domain::ticket::{Category, Priority, Status, TicketFilter, TicketPatch, TicketRecord};
use crate::error::{AppError, AppResult};
use crate::workflow::ticket::{TicketIntake, open_ticket};

#[derive(Args, Debug, Clone)]
pub struct TicketArgs {
    #[command(subcommand)]
    pub command: TicketCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TicketCommand {
    /// Open a ticket; omitted category or priority is suggested by the model.
    Create(CreateArgs),
    /// Print a single ticket.
    Show { id: u64 },
    /// List tickets, newest first.
    List(ListArgs),
    /// Change fields of an existing ticket.
    Update(UpdateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub status: Option<Status>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub status: Option<Status>,
    /// Case-insensitive match against title and description.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    pub id: u64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub status: Option<Status>,
}

pub enum TicketOutput {
    One(TicketRecord),
    Many(Vec<TicketRecord>),
}

pub async fn run(ctx: &AppContext, command: TicketCommand) -> AppResult<TicketOutput> {
    match command {
        TicketCommand::Create(args) => {
            let intake = TicketIntake {
                title: args.title,
                description: args.description,
                category: args.category,
                priority: args.priority,
                status: args.status,
            };
            Ok(TicketOutput::One(open_ticket(ctx, intake).await?))
        }
        TicketCommand::Show { id } => ctx
            .tickets
            .get(id)
            .await?
            .map(TicketOutput::One)
            .ok_or_else(|| AppError::NotFound(format!("ticket {id}"))),
        TicketCommand::List(args) => {
            let filter = TicketFilter {
                category: args.category,
                priority: args.priority,
                status: args.status,
                search: args.search,
            };
            Ok(TicketOutput::Many(ctx.tickets.list(&filter).await?))
        }
        TicketCommand::Update(args) => {
            let patch = TicketPatch {
                title: args.title,
                description: args.description,
                category: args.category,
                priority: args.priority,
                status: args.status,
            };
            Ok(TicketOutput::One(ctx.tickets.update(args.id, patch).await?))
        }
    }
}
