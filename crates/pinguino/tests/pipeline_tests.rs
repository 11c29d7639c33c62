
use std::sync::atomic::Ordering;

use fakes::{fixture_csv, fixture_dataset, CountingRenderer, CountingService, CountingSource};
use panels::Tone;
use pinguino::charts::{ChartData, ChartKind};
use pinguino::dataset::DataStore;
use pinguino::generation::{GenerationClient, GenerationFailure};
use pinguino::pipeline::{self, Block, DashboardRequest, INSIGHTS_HEADING};
use pinguino::session::SessionCache;

fn strings(values: &[&str]) -> Vec<String> {
  values.iter().map(|v| v.to_string()).collect()
}

fn configured(service: &CountingService) -> GenerationClient {
  GenerationClient::with_service(Box::new(service.clone()), Some("sk-test".to_string()), "m")
}

#[tokio::test]
async fn test_adelie_only_dashboard_counts_fixture_rows() {
  let store = DataStore::preloaded(fixture_dataset());
  let service = CountingService::replying("generated");
  let request =
    DashboardRequest::dashboard(ChartKind::Scatter).with_filters(strings(&["Adelie"]), vec![]);

  let view = pipeline::run(
    &request,
    &store,
    &mut SessionCache::new(),
    &configured(&service),
    &mut CountingRenderer::default(),
  )
  .await
  .unwrap();

  let adelie = fixture_dataset().clean().iter().filter(|r| r.species == "Adelie").count();
  assert_eq!(adelie, 60);
  assert_eq!(view.row_count, adelie);
  assert_eq!(view.notices(Tone::Info)[0], "Showing data for 60 penguins");
  // Only the species description
  assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn test_box_plot_with_single_row_renders() {
  let csv = format!("{}\nGentoo,Biscoe,47.0,15.0,215,5000,Female\n", fakes::HEADER);
  let store = DataStore::new(Box::new(CountingSource::new(csv)));
  let mut renderer = CountingRenderer::default();
  let client = GenerationClient::with_service(
    Box::new(CountingService::replying("unused")),
    None,
    "m",
  );

  let view = pipeline::run(
    &DashboardRequest::dashboard(ChartKind::Box),
    &store,
    &mut SessionCache::new(),
    &client,
    &mut renderer,
  )
  .await
  .unwrap();

  assert_eq!(view.row_count, 1);
  assert_eq!(renderer.specs.len(), 1);
  match &renderer.specs[0].data {
    ChartData::ByGroup { groups, .. } => {
      assert_eq!(groups.len(), 1);
      assert_eq!(groups[0].values, vec![5000.0]);
    }
    other => panic!("Expected grouped data, got: {other:?}"),
  }
  assert!(view.notices(Tone::Error).is_empty());
}

#[tokio::test]
async fn test_pair_plot_with_no_rows_warns_without_rendering() {
  let store = DataStore::preloaded(fixture_dataset());
  let mut renderer = CountingRenderer::default();
  let service = CountingService::replying("unused");
  let request = DashboardRequest::dashboard(ChartKind::Pair)
    .with_filters(strings(&["Gentoo"]), strings(&["Atlantis"]));

  let view = pipeline::run(
    &request,
    &store,
    &mut SessionCache::new(),
    &configured(&service),
    &mut renderer,
  )
  .await
  .unwrap();

  assert_eq!(view.row_count, 0);
  assert!(renderer.specs.is_empty());
  assert_eq!(
    view.notices(Tone::Warning),
    vec!["Not present in the dataset: Atlantis", "Not enough data to draw a Pair Plot."]
  );
  // The description does not depend on the view
  assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn test_species_missing_from_dataset_is_flagged_not_described() {
  let store = DataStore::preloaded(fixture_dataset());
  let service = CountingService::replying("An Emperor text");
  let request =
    DashboardRequest::dashboard(ChartKind::Scatter).with_filters(strings(&["Emperor"]), vec![]);

  let view = pipeline::run(
    &request,
    &store,
    &mut SessionCache::new(),
    &configured(&service),
    &mut CountingRenderer::default(),
  )
  .await
  .unwrap();

  assert_eq!(view.row_count, 0);
  assert_eq!(service.call_count(), 0);
  assert!(view.notices(Tone::Warning).contains(&"Not present in the dataset: Emperor"));
  assert!(!view.has_heading("About the Emperor penguin"));
}

#[tokio::test]
async fn test_failed_description_is_not_requested_again() {
  let store = DataStore::preloaded(fixture_dataset());
  let service = CountingService::with(|_| Err(GenerationFailure::transport("boom")));
  let client = configured(&service);
  let mut cache = SessionCache::new();
  let request =
    DashboardRequest::dashboard(ChartKind::Box).with_filters(strings(&["Adelie"]), vec![]);

  let mut renderer = CountingRenderer::default();
  for _ in 0..2 {
    let view = pipeline::run(&request, &store, &mut cache, &client, &mut renderer).await.unwrap();
    assert!(view.notices(Tone::Error).iter().any(|e| e.contains("boom")));
  }

  assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn test_dataset_is_fetched_once_across_interactions() {
  let source = CountingSource::new(fixture_csv());
  let fetches = source.fetches.clone();
  let store = DataStore::new(Box::new(source));
  let service = CountingService::replying("Adelie text");
  let client = configured(&service);
  let mut cache = SessionCache::new();
  let mut renderer = CountingRenderer::default();

  let selections =
    [vec![], strings(&["Adelie"]), strings(&["Chinstrap", "Gentoo"]), strings(&["Adelie"])];
  for species in selections {
    let request = DashboardRequest::dashboard(ChartKind::Violin).with_filters(species, vec![]);
    pipeline::run(&request, &store, &mut cache, &client, &mut renderer).await.unwrap();
  }

  assert_eq!(fetches.load(Ordering::SeqCst), 1);
  assert_eq!(renderer.specs.len(), 4);
  // Adelie was described once and served from the cache afterwards
  assert_eq!(service.call_count(), 1);
  assert_eq!(cache.get("Adelie"), Some("Adelie text"));
}

#[tokio::test]
async fn test_insight_prompt_carries_digest_of_filtered_rows() {
  let store = DataStore::preloaded(fixture_dataset());
  let service = CountingService::with(|request| {
    if request.prompt.contains("insights") {
      let raw = "Insight 1\n\nGentoo are heaviest.\nDream has most Chinstrap.\n\
                 Biscoe is mixed.\nExtra.";
      Ok(raw.to_string())
    } else {
      Err(GenerationFailure::EmptyResponse)
    }
  });
  let request = DashboardRequest::default()
    .with_filters(vec![], strings(&["Dream"]))
    .with_insights(true);

  let view = pipeline::run(
    &request,
    &store,
    &mut SessionCache::new(),
    &configured(&service),
    &mut CountingRenderer::default(),
  )
  .await
  .unwrap();

  assert!(view.has_heading(INSIGHTS_HEADING));
  assert_eq!(
    view.insights().unwrap(),
    ["Gentoo are heaviest.", "Dream has most Chinstrap.", "Biscoe is mixed."]
  );
  let prompts = service.prompts.lock().unwrap();
  assert_eq!(prompts.len(), 1);
  assert!(prompts[0].contains("Adelie"));
  assert!(prompts[0].contains("Chinstrap"));
  assert!(prompts[0].contains("Gentoo"));
  assert!(!prompts[0].contains("Torgersen"));
}

#[tokio::test]
async fn test_question_failure_is_shown_as_error_panel() {
  let store = DataStore::preloaded(fixture_dataset());
  let service =
    CountingService::with(|_| Err(GenerationFailure::transport("connection reset by peer")));
  let request = DashboardRequest::default().with_question(Some("Which is largest?".to_string()));

  let view = pipeline::run(
    &request,
    &store,
    &mut SessionCache::new(),
    &configured(&service),
    &mut CountingRenderer::default(),
  )
  .await
  .unwrap();

  assert_eq!(service.call_count(), 1);
  let errors = view.notices(Tone::Error);
  assert_eq!(errors.len(), 1);
  assert!(errors[0].contains("connection reset by peer"));
  assert!(!view.blocks.iter().any(|b| matches!(b, Block::Notice(n) if n.tone == Tone::Success)));
}
