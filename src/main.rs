use std::process::ExitCode;

use dreamspace::models::ArtisanQuery;
use dreamspace::{ApiClient, ApiError, AuthStore, SessionEvent};
use log::error;
use tokio::sync::broadcast::{self, error::TryRecvError};

const USAGE: &str = "usage: dreamspace <login EMAIL PASSWORD | whoami | projects | tasks [PROJECT_ID] | artisans [SEARCH] | logout>";

async fn run(store: &AuthStore, args: &[String]) -> Result<(), ApiError> {
    let client = store.client();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["login", email, password] => {
            let user = store.login(email, password).await?;
            println!("Logged in as {} <{}> ({:?})", user.full_name(), user.email, user.role);
        }
        ["whoami"] => {
            if !client.session().is_authenticated()? {
                println!("Not logged in");
                return Ok(());
            }
            let projects = client.projects();
            let (user, projects) = futures::try_join!(store.fetch_user(), projects.list())?;
            if let Some(user) = user {
                println!("{} <{}> ({:?})", user.full_name(), user.email, user.role);
            }
            println!("{} project(s)", projects.len());
        }
        ["projects"] => {
            for project in client.projects().list().await? {
                println!(
                    "#{:<5} {:<40} {} task(s)",
                    project.id, project.name, project.tasks_count
                );
            }
        }
        ["tasks", rest @ ..] => {
            let project = match rest.first() {
                Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                    ApiError::Config(format!("project id must be a number, got {:?}", raw))
                })?),
                None => None,
            };
            for task in client.tasks().list(project).await? {
                println!("#{:<5} [{:?}] {}", task.id, task.status, task.title);
            }
        }
        ["artisans", rest @ ..] => {
            let filters = ArtisanQuery {
                search: rest.first().map(|s| s.to_string()),
                ..ArtisanQuery::default()
            };
            for artisan in client.artisans().list(&filters).await? {
                println!(
                    "#{:<5} {:<32} {} {} ({})",
                    artisan.id,
                    artisan.business_name,
                    artisan.city,
                    artisan.state,
                    artisan.average_rating
                );
            }
        }
        ["logout"] => {
            store.logout().await?;
            println!("Logged out");
        }
        _ => {
            eprintln!("{}", USAGE);
        }
    }
    Ok(())
}

/// Drains every event received so far and reports whether the session expired.
fn session_expired(events: &mut broadcast::Receiver<SessionEvent>) -> bool {
    let mut expired = false;
    loop {
        match events.try_recv() {
            Ok(event) => expired |= event == SessionEvent::Expired,
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return expired,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let client = match ApiClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut events = client.session().subscribe();
    let store = AuthStore::new(client);
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = run(&store, &args).await;

    if session_expired(&mut events) {
        eprintln!("Your session has expired. Run `dreamspace login` to sign in again.");
    }
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            match store.state().await.error {
                Some(message) => eprintln!("{}", message),
                None => eprintln!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}
