//! # Kanban CLI
//!
//! Command-line client for the Kanban API server.
//!
//! ## Usage
//!
//! ```bash
//! kanban add-user --nome "Ana Silva" --email ana@x.com
//! kanban add-task --descricao "Revisar relatório" --setor TI --usuario 1 --prioridade Alta
//! kanban move 1 Fazendo
//! kanban board
//! kanban delete 1 --yes
//! ```

use clap::{Parser, Subcommand};
use kanban_client::{
    api::{HttpClient, KanbanApi},
    board::Board,
    forms::{FormError, TaskForm, UserForm},
    notice::Notice,
};
use kanban_shared::models::task::Status;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "kanban", version, about = "Kanban board client")]
struct Cli {
    /// Base URL of the Kanban API server
    #[arg(long, env = "KANBAN_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
enum Commands {
    /// Show the board, one column per status
    Board,

    /// List registered users
    Users,

    /// Register a user
    AddUser {
        #[arg(long)]
        nome: String,
        #[arg(long)]
        email: String,
    },

    /// Create a task in "A Fazer"
    AddTask {
        #[arg(long)]
        descricao: String,
        #[arg(long)]
        setor: String,
        /// Id of the assigned user
        #[arg(long)]
        usuario: String,
        /// Alta, Media or Baixa
        #[arg(long)]
        prioridade: String,
    },

    /// Change the status of a task
    Move { id: i64, status: Status },

    /// Simulate dropping a dragged card on a column
    Drop { payload: String, column: Status },

    /// Edit a task; omitted fields keep their current value
    Edit {
        id: i64,
        #[arg(long)]
        descricao: Option<String>,
        #[arg(long)]
        setor: Option<String>,
        #[arg(long)]
        usuario: Option<String>,
        #[arg(long)]
        prioridade: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },

    /// Delete a task
    Delete {
        id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kanban_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let api = HttpClient::new(cli.api_url);

    let ok = match cli.command {
        Commands::Board => {
            let board = Board::load(&api).await?;
            print_board(&board);
            true
        }
        Commands::Users => {
            for user in api.list_users().await? {
                println!("{:>4}  {:<30} {}", user.id, user.nome, user.email);
            }
            true
        }
        Commands::AddUser { nome, email } => {
            let mut form = UserForm { nome, email };
            report(form.submit(&api).await.map(|(user, notice)| {
                println!("Usuário #{}: {}", user.id, user.nome);
                notice
            }))
        }
        Commands::AddTask {
            descricao,
            setor,
            usuario,
            prioridade,
        } => {
            let mut form = TaskForm {
                descricao,
                setor,
                usuario,
                prioridade,
            };
            report(form.submit(&api).await.map(|(task, notice)| {
                println!("Tarefa #{}: {}", task.id, task.descricao);
                notice
            }))
        }
        Commands::Move { id, status } => {
            let mut board = Board::load(&api).await?;
            board.select_status(id, status);
            show(board.confirm_status(&api, id).await)
        }
        Commands::Drop { payload, column } => {
            let mut board = Board::load(&api).await?;
            show(board.drop_on_column(&api, &payload, column).await)
        }
        Commands::Edit {
            id,
            descricao,
            setor,
            usuario,
            prioridade,
            status,
        } => {
            let mut board = Board::load(&api).await?;
            let Some(mut form) = board.open_edit(id) else {
                anyhow::bail!("Tarefa não encontrada");
            };
            if let Some(descricao) = descricao {
                form.descricao = descricao;
            }
            if let Some(setor) = setor {
                form.setor = setor;
            }
            if let Some(usuario) = usuario {
                form.usuario = usuario;
            }
            if let Some(prioridade) = prioridade {
                form.prioridade = prioridade;
            }
            if let Some(status) = status {
                form.status = status;
            }
            let ok = report(board.submit_edit(&api, id, &form).await);
            warn_stale(&mut board);
            ok
        }
        Commands::Delete { id, yes } => {
            let mut board = Board::load(&api).await?;
            let Some(pending) = board.request_delete(id) else {
                anyhow::bail!("Tarefa não encontrada");
            };
            if yes {
                let notice = pending.confirm(&api, &mut board).await;
                let ok = show(Some(notice));
                warn_stale(&mut board);
                ok
            } else {
                println!("{}", pending.prompt());
                println!("Use --yes para confirmar.");
                pending.cancel();
                true
            }
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn print_board(board: &Board) {
    for column in board.columns() {
        println!("== {} ==", column.heading());
        if column.tasks.is_empty() {
            println!("   {}", column.empty_text());
        }
        for task in &column.tasks {
            println!(
                "{:>4}  {} [{}] {} - {}",
                task.id,
                task.descricao,
                task.setor,
                task.prioridade,
                board.owner_name(task)
            );
        }
        println!();
    }
}

/// Reports a failed reload after a write that went through
fn warn_stale(board: &mut Board) {
    if let Some(notice) = board.take_reload_error() {
        eprintln!("{}", notice);
    }
}

/// Prints a notice; returns whether it reports success
fn show(notice: Option<Notice>) -> bool {
    match notice {
        Some(notice) if notice.is_success() => {
            println!("{}", notice);
            true
        }
        Some(notice) => {
            eprintln!("{}", notice);
            false
        }
        None => {
            println!("Nada a alterar");
            true
        }
    }
}

fn report(outcome: Result<Notice, FormError>) -> bool {
    match outcome {
        Ok(notice) => show(Some(notice)),
        Err(FormError::Invalid(errors)) => {
            for (field, messages) in errors.iter() {
                for message in messages {
                    eprintln!("{}: {}", field, message);
                }
            }
            false
        }
        Err(FormError::Rejected { notice, .. }) => show(Some(notice)),
    }
}
