use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cerita::api::{ApiClient, ListFilter, Story, StoryDraft};
use cerita::config::Config;
use cerita::net::{CachingTransport, HttpRequest, ReqwestTransport, ResponseCache, Transport};
use cerita::store::StoryStore;
use cerita::sync::{ConnectivityWatch, SyncService};

#[derive(Parser, Debug)]
#[command(name = "cerita")]
#[command(about = "Offline-first client for a story-sharing API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/cerita/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Bearer token (default: CERITA_TOKEN environment variable)
  #[arg(short, long)]
  token: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List stories, from the network when reachable, cached otherwise
  List {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    size: Option<u32>,
    /// Only stories that carry coordinates
    #[arg(long)]
    location: bool,
  },
  /// Show a single story
  Get { id: String },
  /// Share a story; queued for replay if the backend is unreachable
  Add {
    description: String,
    #[arg(long)]
    photo: PathBuf,
    #[arg(long)]
    lat: Option<f64>,
    #[arg(long)]
    lon: Option<f64>,
  },
  /// Replay queued submissions and refresh the cached list
  Sync,
  /// Watch connectivity and sync automatically on reconnect
  Watch {
    /// Probe interval in seconds
    #[arg(long, default_value_t = 30)]
    interval: u64,
  },
  /// Manage cached stories
  Cached {
    #[command(subcommand)]
    command: CachedCommand,
  },
  /// Manage queued submissions
  Pending {
    #[command(subcommand)]
    command: PendingCommand,
  },
  /// Clear all offline data: cached stories, queue, and preferences
  Reset,
}

#[derive(Subcommand, Debug)]
enum CachedCommand {
  List,
  Delete { id: String },
  Clear,
}

#[derive(Subcommand, Debug)]
enum PendingCommand {
  List,
  Delete { local_id: i64 },
  Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_tracing()?;

  let config = Config::load(args.config.as_deref())?;
  let token = Config::token(args.token.clone());

  let cache = ResponseCache::open(&config.response_cache_path()?, &config.cache.generation)?;
  let transport = CachingTransport::new(ReqwestTransport::new(), cache, config.api.base_url.clone());
  let api = ApiClient::new(transport, config.api.base_url.clone());
  let store = Arc::new(StoryStore::open(&config.store_path()?)?);
  let service = SyncService::new(api, store, token, config.sync.page_size);

  match args.command {
    Command::List {
      page,
      size,
      location,
    } => {
      let filter = ListFilter {
        page,
        size,
        with_location: location.then_some(true),
      };
      let outcome = service.list(&filter).await?;
      if outcome.from_cache {
        match outcome.last_sync_at {
          Some(at) => println!("(offline, cached data from {})", at.format("%Y-%m-%d %H:%M")),
          None => println!("(offline, cached data)"),
        }
      }
      for story in &outcome.stories {
        print_story_line(story);
      }
    }

    Command::Get { id } => {
      let outcome = service.detail(&id).await?;
      if outcome.from_cache {
        println!("(offline, cached data)");
      }
      print_story(&outcome.story);
    }

    Command::Add {
      description,
      photo,
      lat,
      lon,
    } => {
      let draft = StoryDraft {
        description,
        photo_path: photo,
        lat,
        lon,
      };
      let outcome = service.add(&draft).await?;
      if outcome.queued {
        println!("backend unreachable, story queued for the next sync");
      } else {
        println!("story shared");
        if let Some(story) = outcome.story {
          print_story_line(&story);
        }
      }
    }

    Command::Sync => {
      let report = service.replay_pending().await?;
      println!(
        "replayed {} queued submission(s), {} remaining",
        report.replayed, report.remaining
      );
      let outcome = service.list(&ListFilter::first_page(config.sync.page_size)).await?;
      println!("cached list refreshed ({} stories)", outcome.stories.len());
    }

    Command::Watch { interval } => {
      let connectivity = ConnectivityWatch::new(true);
      let receiver = connectivity.subscribe();
      let service = Arc::new(service);
      let worker = {
        let service = service.clone();
        tokio::spawn(async move { service.run_on_reconnect(receiver).await })
      };

      // Probe with a plain transport so the response cache cannot fake an
      // online verdict.
      let probe = ReqwestTransport::new();
      let probe_request = HttpRequest::get(config.api.base_url.clone(), None);
      println!("watching connectivity every {interval}s, ctrl-c to stop");
      loop {
        let online = probe.send(&probe_request).await.is_ok();
        connectivity.set_online(online);
        tokio::time::sleep(Duration::from_secs(interval)).await;
        if worker.is_finished() {
          break;
        }
      }
    }

    Command::Cached { command } => match command {
      CachedCommand::List => {
        for story in service.cached_stories()? {
          print_story_line(&story);
        }
      }
      CachedCommand::Delete { id } => {
        service.delete_cached(&id)?;
        println!("removed {id} from the cache");
      }
      CachedCommand::Clear => {
        service.clear_cached()?;
        println!("cached stories cleared");
      }
    },

    Command::Pending { command } => match command {
      PendingCommand::List => {
        for entry in service.pending()? {
          println!(
            "#{}  {}  {}  ({})",
            entry.local_id,
            entry.queued_at.format("%Y-%m-%d %H:%M"),
            entry.description,
            entry.photo_ref
          );
        }
      }
      PendingCommand::Delete { local_id } => {
        service.delete_pending(local_id)?;
        println!("removed #{local_id} from the queue");
      }
      PendingCommand::Clear => {
        for entry in service.pending()? {
          service.delete_pending(entry.local_id)?;
        }
        println!("pending queue cleared");
      }
    },

    Command::Reset => {
      service.clear_offline_data()?;
      println!("offline data cleared");
    }
  }

  Ok(())
}

fn print_story_line(story: &Story) {
  println!(
    "{}  {}  {}: {}",
    story.id,
    story.created_at.format("%Y-%m-%d %H:%M"),
    story.name,
    story.description
  );
}

fn print_story(story: &Story) {
  println!("{} by {}", story.id, story.name);
  println!("  {}", story.description);
  println!("  photo: {}", story.photo_url);
  if let (Some(lat), Some(lon)) = (story.lat, story.lon) {
    println!("  location: {lat}, {lon}");
  }
  println!("  created: {}", story.created_at.format("%Y-%m-%d %H:%M"));
}

/// Log to a file under the data directory; stdout stays for command output.
fn init_tracing() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .map(|p| p.join("cerita").join("logs"))
    .unwrap_or_else(|| PathBuf::from("."));
  std::fs::create_dir_all(&log_dir)?;

  let appender = tracing_appender::rolling::daily(log_dir, "cerita.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
