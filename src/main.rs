use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lms_client::models::{
    Pagination, RegisterRequest, SubmissionFile, SubmissionStatus, UpdateSubmissionRequest,
    UserRole,
};
use lms_client::{ApiClient, AuthSession, ClientConfig, SqliteTokenStore};

#[derive(Parser)]
#[command(name = "lms", about = "Command-line client for the learning platform API", version)]
struct Cli {
    /// API base URL (default: $LMS_API_URL or http://localhost:8000)
    #[arg(long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login { email: String, password: String },
    /// Create an account and log in with it
    Register {
        email: String,
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        /// student, trainer or admin
        #[arg(long)]
        role: Option<UserRole>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List courses
    Courses {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Show one course
    Course { id: i64 },
    /// Enroll in a course
    Enroll { id: i64 },
    /// List my enrollments
    Enrollments,
    /// List assignments, optionally for one course
    Assignments {
        #[arg(long)]
        course: Option<i64>,
    },
    /// Show one assignment with its visible submissions
    Assignment { id: i64 },
    /// Submit work for an assignment
    Submit {
        id: i64,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List submissions for an assignment
    Submissions { id: i64 },
    /// Show one submission
    Submission { id: i64 },
    /// Review a submission
    Grade {
        id: i64,
        #[arg(long)]
        status: Option<SubmissionStatus>,
        #[arg(long)]
        score: Option<i32>,
        #[arg(long)]
        feedback: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "lms_client=info,lms=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::new_from_env()?;
    if let Some(server) = cli.server {
        config = config.with_base_url(server);
    }

    let store = Arc::new(SqliteTokenStore::connect(&config.session_db).await?);
    info!("using API at {}", config.base_url);
    let client = Arc::new(ApiClient::new(config, store).await?);
    let auth = AuthSession::new(client.clone());

    match cli.command {
        Commands::Login { email, password } => print_json(&auth.login(&email, &password).await?)?,
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
            role,
        } => {
            let data = RegisterRequest {
                email,
                password,
                first_name,
                last_name,
                role,
            };
            print_json(&auth.register(&data).await?)?
        }
        Commands::Logout => {
            auth.logout().await;
            println!("Logged out");
        }
        Commands::Whoami => match auth.check_auth().await {
            Some(user) => print_json(&user)?,
            None => println!("Not logged in"),
        },
        Commands::Courses { skip, limit } => {
            print_json(&client.get_courses(Pagination::new(skip, limit)).await?)?
        }
        Commands::Course { id } => print_json(&client.get_course(id).await?)?,
        Commands::Enroll { id } => print_json(&client.enroll_course(id).await?)?,
        Commands::Enrollments => print_json(&client.get_my_enrollments().await?)?,
        Commands::Assignments { course } => print_json(&client.get_assignments(course).await?)?,
        Commands::Assignment { id } => print_json(&client.get_assignment(id).await?)?,
        Commands::Submit { id, content, file } => {
            if content.is_none() && file.is_none() {
                return Err("provide --content, --file or both".into());
            }
            let file = match file {
                Some(path) => Some(SubmissionFile::from_path(&path).await?),
                None => None,
            };
            print_json(&client.submit_assignment(id, content.as_deref(), file).await?)?
        }
        Commands::Submissions { id } => print_json(&client.get_submissions(id).await?)?,
        Commands::Submission { id } => print_json(&client.get_submission(id).await?)?,
        Commands::Grade {
            id,
            status,
            score,
            feedback,
        } => {
            let update = UpdateSubmissionRequest {
                content: None,
                status,
                score,
                feedback,
            };
            print_json(&client.update_submission(id, &update).await?)?
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
