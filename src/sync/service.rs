use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ListFilter, RemoteApi, Story, StoryDraft};
use crate::error::SyncError;
use crate::store::{
  PendingDraft, PendingSubmission, StoryStore, PREF_IS_ONLINE, PREF_LAST_SYNC_AT,
};

/// Result of a list read, tagged with where the data came from.
#[derive(Debug, Clone)]
pub struct ListOutcome {
  pub stories: Vec<Story>,
  /// True when the network was not used and the local store answered.
  pub from_cache: bool,
  /// Last successful full-list refresh, attached so the caller can disclose
  /// staleness alongside cached data.
  pub last_sync_at: Option<DateTime<Utc>>,
}

/// Result of a detail read.
#[derive(Debug, Clone)]
pub struct DetailOutcome {
  pub story: Story,
  pub from_cache: bool,
}

/// Result of a create.
#[derive(Debug, Clone)]
pub struct AddOutcome {
  /// The stored record, when the backend echoed it back.
  pub story: Option<Story>,
  /// True when the backend was unreachable and the submission was queued
  /// for replay instead.
  pub queued: bool,
}

/// Result of a pending-queue replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
  pub replayed: usize,
  pub remaining: usize,
}

/// Orchestrates every read and write against the remote API and the local
/// store.
///
/// Reads are network-first with a cache fallback on transport failure only;
/// a server-reported error is returned verbatim, never masked by stale
/// data. Writes fall back to the pending queue. The credential is held
/// explicitly; there is no ambient authentication state.
pub struct SyncService<A: RemoteApi> {
  api: A,
  store: Arc<StoryStore>,
  credential: Option<String>,
  page_size: u32,
}

impl<A: RemoteApi> SyncService<A> {
  pub fn new(api: A, store: Arc<StoryStore>, credential: Option<String>, page_size: u32) -> Self {
    Self {
      api,
      store,
      credential,
      page_size,
    }
  }

  // --- read path ------------------------------------------------------

  /// List stories: network first when a credential is held, cached data on
  /// transport failure, `MissingAuthentication` when neither applies.
  pub async fn list(&self, filter: &ListFilter) -> Result<ListOutcome, SyncError> {
    let Some(token) = self.credential.as_deref() else {
      // No guest-read mode: cached data or a sign-in prompt.
      return self.cached_list(SyncError::MissingAuthentication);
    };

    match self.api.list_stories(token, filter).await {
      Ok(stories) => {
        let now = Utc::now();
        // The caller already has the live data; a store failure here only
        // costs the next offline session.
        if let Err(err) = self.persist_list(&stories, now) {
          warn!(error = %err, "failed to persist fetched stories");
        }
        Ok(ListOutcome {
          stories,
          from_cache: false,
          last_sync_at: Some(now),
        })
      }
      Err(err) if err.is_transport() => {
        debug!(error = %err, "network unreachable, falling back to cached stories");
        self.cached_list(SyncError::NoCachedData)
      }
      Err(err) => Err(err.into()),
    }
  }

  /// Fetch a single story, same policy as [`SyncService::list`].
  pub async fn detail(&self, id: &str) -> Result<DetailOutcome, SyncError> {
    let Some(token) = self.credential.as_deref() else {
      return self.cached_detail(id, SyncError::MissingAuthentication);
    };

    match self.api.story_detail(token, id).await {
      Ok(story) => {
        if let Err(err) = self.store.put_story(&story) {
          warn!(error = %err, id, "failed to persist fetched story");
        }
        Ok(DetailOutcome {
          story,
          from_cache: false,
        })
      }
      Err(err) if err.is_transport() => {
        debug!(error = %err, id, "network unreachable, falling back to cached story");
        self.cached_detail(id, SyncError::NoCachedData)
      }
      Err(err) => Err(err.into()),
    }
  }

  fn cached_list(&self, on_empty: SyncError) -> Result<ListOutcome, SyncError> {
    let stories = self.store.all_stories()?;
    if stories.is_empty() {
      return Err(on_empty);
    }
    Ok(ListOutcome {
      stories,
      from_cache: true,
      last_sync_at: self.last_sync_at(),
    })
  }

  fn cached_detail(&self, id: &str, on_absent: SyncError) -> Result<DetailOutcome, SyncError> {
    match self.store.story(id)? {
      Some(story) => Ok(DetailOutcome {
        story,
        from_cache: true,
      }),
      None => Err(on_absent),
    }
  }

  fn persist_list(&self, stories: &[Story], now: DateTime<Utc>) -> Result<(), SyncError> {
    self.store.put_stories(stories)?;
    self.record_sync_time(now)?;
    Ok(())
  }

  /// `last_sync_at` only moves forward, whatever order refreshes complete in.
  fn record_sync_time(&self, now: DateTime<Utc>) -> Result<(), SyncError> {
    let current: Option<DateTime<Utc>> = self.store.preference(PREF_LAST_SYNC_AT)?;
    if current.map_or(true, |t| now > t) {
      self.store.set_preference(PREF_LAST_SYNC_AT, &now)?;
    }
    Ok(())
  }

  pub fn last_sync_at(&self) -> Option<DateTime<Utc>> {
    self.store.preference(PREF_LAST_SYNC_AT).unwrap_or_default()
  }

  // --- write path -----------------------------------------------------

  /// Create a story.
  ///
  /// Authenticated: create remotely; on success persist the echoed record
  /// and opportunistically refresh the first list page (that refresh may
  /// fail without failing the create). If the backend is unreachable the
  /// submission is queued for replay and the call reports `queued: true`.
  /// Without a credential the guest endpoint is used, fire-and-forget.
  pub async fn add(&self, draft: &StoryDraft) -> Result<AddOutcome, SyncError> {
    let Some(token) = self.credential.as_deref() else {
      let story = self.api.create_story_guest(draft).await?;
      return Ok(AddOutcome {
        story,
        queued: false,
      });
    };

    match self.api.create_story(token, draft).await {
      Ok(story) => {
        if let Some(story) = &story {
          if let Err(err) = self.store.put_story(story) {
            warn!(error = %err, "failed to persist created story");
          }
        }
        self.refresh_first_page(token).await;
        Ok(AddOutcome {
          story,
          queued: false,
        })
      }
      Err(err) if err.is_transport() => {
        let pending = self.store.enqueue_pending(&PendingDraft {
          description: draft.description.clone(),
          photo_ref: draft.photo_path.display().to_string(),
          lat: draft.lat,
          lon: draft.lon,
        })?;
        info!(
          local_id = pending.local_id,
          "backend unreachable, story queued for replay"
        );
        Ok(AddOutcome {
          story: None,
          queued: true,
        })
      }
      Err(err) => Err(err.into()),
    }
  }

  /// Secondary refresh after a successful create; swallows its own failures.
  async fn refresh_first_page(&self, token: &str) {
    let filter = ListFilter::first_page(self.page_size);
    match self.api.list_stories(token, &filter).await {
      Ok(stories) => {
        if let Err(err) = self.persist_list(&stories, Utc::now()) {
          warn!(error = %err, "post-create cache refresh not persisted");
        }
      }
      Err(err) => {
        warn!(error = %err, "post-create cache refresh failed");
      }
    }
  }

  // --- pending replay -------------------------------------------------

  /// Replay queued submissions in enqueue order.
  ///
  /// Each entry leaves the queue only once the backend confirms it, in the
  /// same transaction that stores the resulting record. A transport failure
  /// stops the replay (still offline); a server rejection leaves the entry
  /// queued and moves on.
  pub async fn replay_pending(&self) -> Result<ReplayReport, SyncError> {
    let Some(token) = self.credential.as_deref() else {
      return Err(SyncError::MissingAuthentication);
    };

    let queue = self.store.pending_submissions()?;
    let mut replayed = 0;

    for entry in &queue {
      let draft = StoryDraft {
        description: entry.description.clone(),
        photo_path: entry.photo_ref.clone().into(),
        lat: entry.lat,
        lon: entry.lon,
      };

      match self.api.create_story(token, &draft).await {
        Ok(story) => {
          self.store.commit_replayed(entry.local_id, story.as_ref())?;
          replayed += 1;
          info!(local_id = entry.local_id, "queued story replayed");
        }
        Err(err) if err.is_transport() => {
          debug!(local_id = entry.local_id, "backend still unreachable, stopping replay");
          break;
        }
        Err(err) => {
          warn!(
            local_id = entry.local_id,
            error = %err,
            "replay rejected, entry stays queued"
          );
        }
      }
    }

    Ok(ReplayReport {
      replayed,
      remaining: self.store.pending_submissions()?.len(),
    })
  }

  /// React to connectivity transitions until the publisher goes away.
  ///
  /// On every transition the observed state is recorded as a preference; on
  /// offline-to-online the pending queue is replayed and then the first
  /// list page refreshed. Replay and refresh run strictly in sequence so
  /// their store writes never interleave.
  pub async fn run_on_reconnect(&self, mut connectivity: watch::Receiver<bool>) {
    let mut online = *connectivity.borrow();

    loop {
      if connectivity.changed().await.is_err() {
        return;
      }
      let now_online = *connectivity.borrow_and_update();
      let was_online = std::mem::replace(&mut online, now_online);

      if let Err(err) = self.store.set_preference(PREF_IS_ONLINE, &now_online) {
        warn!(error = %err, "failed to record connectivity");
      }

      if now_online && !was_online {
        info!("back online");
        match self.replay_pending().await {
          Ok(report) if report.replayed > 0 => {
            info!(replayed = report.replayed, remaining = report.remaining, "pending queue replayed");
          }
          Ok(_) => {}
          Err(err) => warn!(error = %err, "pending replay failed"),
        }
        if let Err(err) = self.list(&ListFilter::first_page(self.page_size)).await {
          warn!(error = %err, "post-reconnect refresh failed");
        }
      }
    }
  }

  // --- offline data management ---------------------------------------

  pub fn cached_stories(&self) -> Result<Vec<Story>, SyncError> {
    Ok(self.store.all_stories()?)
  }

  pub fn delete_cached(&self, id: &str) -> Result<(), SyncError> {
    Ok(self.store.delete_story(id)?)
  }

  pub fn clear_cached(&self) -> Result<(), SyncError> {
    Ok(self.store.clear_stories()?)
  }

  pub fn pending(&self) -> Result<Vec<PendingSubmission>, SyncError> {
    Ok(self.store.pending_submissions()?)
  }

  pub fn delete_pending(&self, local_id: i64) -> Result<(), SyncError> {
    Ok(self.store.delete_pending(local_id)?)
  }

  /// Clear all three namespaces: cached stories, queue, preferences.
  pub fn clear_offline_data(&self) -> Result<(), SyncError> {
    self.store.clear_stories()?;
    self.store.clear_pending()?;
    self.store.clear_preferences()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sync::ConnectivityWatch;
  use async_trait::async_trait;
  use chrono::TimeZone;
  use std::collections::VecDeque;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;
  use std::time::Duration;

  fn story(id: &str) -> Story {
    Story {
      id: id.to_string(),
      name: "dinda".to_string(),
      description: format!("story {id}"),
      photo_url: format!("https://api.test/images/{id}.jpg"),
      lat: None,
      lon: None,
      created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
    }
  }

  fn draft(description: &str) -> StoryDraft {
    StoryDraft {
      description: description.to_string(),
      photo_path: "/photos/a.jpg".into(),
      lat: None,
      lon: None,
    }
  }

  /// A canned response; `ApiError` is not `Clone`, so responses are rebuilt
  /// on dequeue.
  enum Canned<T> {
    Ok(T),
    Transport,
    Server(&'static str),
  }

  impl<T> Canned<T> {
    fn into_result(self) -> Result<T, ApiError> {
      match self {
        Canned::Ok(value) => Ok(value),
        Canned::Transport => Err(ApiError::Transport("connection timed out".into())),
        Canned::Server(message) => Err(ApiError::Server {
          message: message.to_string(),
        }),
      }
    }
  }

  /// Stub backend: per-endpoint queues of canned responses; an exhausted
  /// queue behaves as unreachable.
  #[derive(Default)]
  struct StubApi {
    list: Mutex<VecDeque<Canned<Vec<Story>>>>,
    detail: Mutex<VecDeque<Canned<Story>>>,
    create: Mutex<VecDeque<Canned<Option<Story>>>>,
    created: Mutex<Vec<StoryDraft>>,
    guest_calls: AtomicUsize,
  }

  impl StubApi {
    fn on_list(self, canned: Canned<Vec<Story>>) -> Self {
      self.list.lock().unwrap().push_back(canned);
      self
    }

    fn on_detail(self, canned: Canned<Story>) -> Self {
      self.detail.lock().unwrap().push_back(canned);
      self
    }

    fn on_create(self, canned: Canned<Option<Story>>) -> Self {
      self.create.lock().unwrap().push_back(canned);
      self
    }

    fn dequeue<T>(queue: &Mutex<VecDeque<Canned<T>>>) -> Result<T, ApiError> {
      queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or(Canned::Transport)
        .into_result()
    }
  }

  #[async_trait]
  impl RemoteApi for StubApi {
    async fn list_stories(
      &self,
      _token: &str,
      _filter: &ListFilter,
    ) -> Result<Vec<Story>, ApiError> {
      Self::dequeue(&self.list)
    }

    async fn story_detail(&self, _token: &str, _id: &str) -> Result<Story, ApiError> {
      Self::dequeue(&self.detail)
    }

    async fn create_story(
      &self,
      _token: &str,
      draft: &StoryDraft,
    ) -> Result<Option<Story>, ApiError> {
      let result = Self::dequeue(&self.create);
      if result.is_ok() {
        self.created.lock().unwrap().push(draft.clone());
      }
      result
    }

    async fn create_story_guest(&self, draft: &StoryDraft) -> Result<Option<Story>, ApiError> {
      self.guest_calls.fetch_add(1, Ordering::SeqCst);
      self.created.lock().unwrap().push(draft.clone());
      Ok(None)
    }
  }

  fn service(api: StubApi, credential: Option<&str>) -> (SyncService<StubApi>, Arc<StoryStore>) {
    let store = Arc::new(StoryStore::in_memory().unwrap());
    let service = SyncService::new(api, store.clone(), credential.map(String::from), 10);
    (service, store)
  }

  #[tokio::test]
  async fn fresh_fetch_persists_and_updates_last_sync() {
    let before = Utc::now();
    let (service, store) = service(
      StubApi::default().on_list(Canned::Ok(vec![story("a")])),
      Some("tok"),
    );

    let outcome = service.list(&ListFilter::default()).await.unwrap();
    assert!(!outcome.from_cache);
    assert_eq!(outcome.stories, vec![story("a")]);

    // Every fetched story is now readable from the store by id
    assert_eq!(store.story("a").unwrap(), Some(story("a")));
    assert_eq!(store.all_stories().unwrap().len(), 1);

    let last_sync: DateTime<Utc> = store.preference(PREF_LAST_SYNC_AT).unwrap().unwrap();
    assert!(last_sync >= before);
  }

  #[tokio::test]
  async fn last_sync_never_moves_backwards() {
    let future = Utc::now() + chrono::Duration::hours(1);
    let (service, store) = service(
      StubApi::default().on_list(Canned::Ok(vec![story("a")])),
      Some("tok"),
    );
    store.set_preference(PREF_LAST_SYNC_AT, &future).unwrap();

    service.list(&ListFilter::default()).await.unwrap();

    let last_sync: DateTime<Utc> = store.preference(PREF_LAST_SYNC_AT).unwrap().unwrap();
    assert_eq!(last_sync, future);
  }

  #[tokio::test]
  async fn transport_failure_falls_back_to_cached_data() {
    let (service, store) = service(StubApi::default().on_list(Canned::Transport), Some("tok"));
    store.put_story(&story("s1")).unwrap();

    let outcome = service.list(&ListFilter::default()).await.unwrap();
    assert!(outcome.from_cache);
    assert_eq!(outcome.stories, vec![story("s1")]);
  }

  #[tokio::test]
  async fn server_error_is_never_masked_by_cache() {
    let (service, store) = service(
      StubApi::default().on_list(Canned::Server("Invalid token")),
      Some("tok"),
    );
    store.put_story(&story("s1")).unwrap();

    let err = service.list(&ListFilter::default()).await.unwrap_err();
    assert!(matches!(err, SyncError::Server { ref message } if message == "Invalid token"));
  }

  #[tokio::test]
  async fn transport_failure_with_empty_cache_is_no_cached_data() {
    let (service, _store) = service(StubApi::default().on_list(Canned::Transport), Some("tok"));

    let err = service.list(&ListFilter::default()).await.unwrap_err();
    assert!(matches!(err, SyncError::NoCachedData));
  }

  #[tokio::test]
  async fn no_credential_and_empty_cache_is_missing_authentication() {
    let (service, _store) = service(StubApi::default(), None);

    let err = service.list(&ListFilter::default()).await.unwrap_err();
    assert!(matches!(err, SyncError::MissingAuthentication));
  }

  #[tokio::test]
  async fn no_credential_still_serves_cached_data() {
    let (service, store) = service(StubApi::default(), None);
    store.put_story(&story("s1")).unwrap();

    let outcome = service.list(&ListFilter::default()).await.unwrap();
    assert!(outcome.from_cache);
    assert_eq!(outcome.stories, vec![story("s1")]);
  }

  #[tokio::test]
  async fn detail_fetch_persists_and_falls_back() {
    let (service, store) = service(
      StubApi::default()
        .on_detail(Canned::Ok(story("a")))
        .on_detail(Canned::Transport),
      Some("tok"),
    );

    let fresh = service.detail("a").await.unwrap();
    assert!(!fresh.from_cache);
    assert_eq!(store.story("a").unwrap(), Some(story("a")));

    let cached = service.detail("a").await.unwrap();
    assert!(cached.from_cache);
    assert_eq!(cached.story, story("a"));
  }

  #[tokio::test]
  async fn detail_transport_failure_without_cache_is_no_cached_data() {
    let (service, _store) = service(StubApi::default().on_detail(Canned::Transport), Some("tok"));

    let err = service.detail("missing").await.unwrap_err();
    assert!(matches!(err, SyncError::NoCachedData));
  }

  #[tokio::test]
  async fn add_persists_echo_and_survives_refresh_failure() {
    // Create succeeds, the follow-up list refresh does not; the create must
    // still report success.
    let (service, store) = service(
      StubApi::default().on_create(Canned::Ok(Some(story("new")))),
      Some("tok"),
    );

    let outcome = service.add(&draft("fresh catch")).await.unwrap();
    assert!(!outcome.queued);
    assert_eq!(outcome.story, Some(story("new")));
    assert_eq!(store.story("new").unwrap(), Some(story("new")));
    assert!(store.pending_submissions().unwrap().is_empty());
  }

  #[tokio::test]
  async fn add_refresh_updates_the_cached_list() {
    let (service, store) = service(
      StubApi::default()
        .on_create(Canned::Ok(None))
        .on_list(Canned::Ok(vec![story("a"), story("b")])),
      Some("tok"),
    );

    service.add(&draft("fresh catch")).await.unwrap();
    assert_eq!(store.all_stories().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn add_on_transport_failure_queues_the_submission() {
    let (service, store) = service(StubApi::default().on_create(Canned::Transport), Some("tok"));

    let outcome = service
      .add(&StoryDraft {
        description: "offline catch".into(),
        photo_path: "/photos/b.jpg".into(),
        lat: Some(-6.2),
        lon: Some(106.8),
      })
      .await
      .unwrap();

    assert!(outcome.queued);
    assert!(outcome.story.is_none());

    let queue = store.pending_submissions().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].description, "offline catch");
    assert_eq!(queue[0].photo_ref, "/photos/b.jpg");
    assert_eq!(queue[0].lat, Some(-6.2));
  }

  #[tokio::test]
  async fn add_server_rejection_is_terminal_and_not_queued() {
    let (service, store) = service(
      StubApi::default().on_create(Canned::Server("description is required")),
      Some("tok"),
    );

    let err = service.add(&draft("")).await.unwrap_err();
    assert!(matches!(err, SyncError::Server { .. }));
    assert!(store.pending_submissions().unwrap().is_empty());
  }

  #[tokio::test]
  async fn guest_add_is_fire_and_forget() {
    let (service, store) = service(StubApi::default(), None);

    let outcome = service.add(&draft("anon")).await.unwrap();
    assert!(!outcome.queued);
    assert_eq!(service.api.guest_calls.load(Ordering::SeqCst), 1);
    assert!(store.all_stories().unwrap().is_empty());
    assert!(store.pending_submissions().unwrap().is_empty());
  }

  #[tokio::test]
  async fn replay_drains_the_queue_in_order() {
    let (service, store) = service(
      StubApi::default()
        .on_create(Canned::Ok(Some(story("first"))))
        .on_create(Canned::Ok(None)),
      Some("tok"),
    );
    store
      .enqueue_pending(&PendingDraft {
        description: "first".into(),
        photo_ref: "/photos/1.jpg".into(),
        lat: None,
        lon: None,
      })
      .unwrap();
    store
      .enqueue_pending(&PendingDraft {
        description: "second".into(),
        photo_ref: "/photos/2.jpg".into(),
        lat: None,
        lon: None,
      })
      .unwrap();

    let report = service.replay_pending().await.unwrap();
    assert_eq!(
      report,
      ReplayReport {
        replayed: 2,
        remaining: 0
      }
    );

    let created = service.api.created.lock().unwrap();
    assert_eq!(created[0].description, "first");
    assert_eq!(created[1].description, "second");
    assert_eq!(store.story("first").unwrap(), Some(story("first")));
  }

  #[tokio::test]
  async fn replay_stops_at_transport_failure_and_keeps_the_rest() {
    let (service, store) = service(
      StubApi::default()
        .on_create(Canned::Ok(None))
        .on_create(Canned::Transport),
      Some("tok"),
    );
    for description in ["first", "second", "third"] {
      store
        .enqueue_pending(&PendingDraft {
          description: description.into(),
          photo_ref: "/photos/x.jpg".into(),
          lat: None,
          lon: None,
        })
        .unwrap();
    }

    let report = service.replay_pending().await.unwrap();
    assert_eq!(
      report,
      ReplayReport {
        replayed: 1,
        remaining: 2
      }
    );

    let queue = store.pending_submissions().unwrap();
    assert_eq!(queue[0].description, "second");
    assert_eq!(queue[1].description, "third");
  }

  #[tokio::test]
  async fn replay_keeps_server_rejected_entries_queued_and_continues() {
    let (service, store) = service(
      StubApi::default()
        .on_create(Canned::Server("photo too large"))
        .on_create(Canned::Ok(None)),
      Some("tok"),
    );
    for description in ["rejected", "accepted"] {
      store
        .enqueue_pending(&PendingDraft {
          description: description.into(),
          photo_ref: "/photos/x.jpg".into(),
          lat: None,
          lon: None,
        })
        .unwrap();
    }

    let report = service.replay_pending().await.unwrap();
    assert_eq!(
      report,
      ReplayReport {
        replayed: 1,
        remaining: 1
      }
    );
    assert_eq!(store.pending_submissions().unwrap()[0].description, "rejected");
  }

  #[tokio::test]
  async fn replay_without_credential_is_missing_authentication() {
    let (service, _store) = service(StubApi::default(), None);
    let err = service.replay_pending().await.unwrap_err();
    assert!(matches!(err, SyncError::MissingAuthentication));
  }

  #[tokio::test]
  async fn reconnect_transition_replays_and_refreshes() {
    let (service, store) = service(
      StubApi::default()
        .on_create(Canned::Ok(None))
        .on_list(Canned::Ok(vec![story("a")])),
      Some("tok"),
    );
    store
      .enqueue_pending(&PendingDraft {
        description: "while offline".into(),
        photo_ref: "/photos/x.jpg".into(),
        lat: None,
        lon: None,
      })
      .unwrap();

    let connectivity = ConnectivityWatch::new(false);
    let receiver = connectivity.subscribe();
    let service = Arc::new(service);
    let worker = {
      let service = service.clone();
      tokio::spawn(async move { service.run_on_reconnect(receiver).await })
    };

    connectivity.set_online(true);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(store.pending_submissions().unwrap().is_empty());
    assert_eq!(store.story("a").unwrap(), Some(story("a")));
    assert_eq!(store.preference::<bool>(PREF_IS_ONLINE).unwrap(), Some(true));

    worker.abort();
  }

  #[tokio::test]
  async fn clear_offline_data_empties_all_namespaces() {
    let (service, store) = service(StubApi::default(), Some("tok"));
    store.put_story(&story("a")).unwrap();
    store
      .enqueue_pending(&PendingDraft {
        description: "queued".into(),
        photo_ref: "/photos/x.jpg".into(),
        lat: None,
        lon: None,
      })
      .unwrap();
    store.set_preference(PREF_IS_ONLINE, &true).unwrap();

    service.clear_offline_data().unwrap();

    assert!(store.all_stories().unwrap().is_empty());
    assert!(store.pending_submissions().unwrap().is_empty());
    assert_eq!(store.preference::<bool>(PREF_IS_ONLINE).unwrap(), None);
  }
}
