//! Pipeline Integration Tests
//!
//! End-to-end collection runs against an in-memory metadata source.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bilicollect::core::{CollectOptions, Collector, DateBoundary};
use bilicollect::domain::{Episode, Section, SeedList, UgcSeason, ViewData};
use bilicollect::{MetadataSource, Unavailable, VideoId};
use tempfile::TempDir;

/// Canned view responses keyed by BV id; anything else is unavailable
#[derive(Default)]
struct FakeSource {
    views: HashMap<String, ViewData>,
    calls: AtomicUsize,
}

impl FakeSource {
    fn with(mut self, bvid: &str, data: ViewData) -> Self {
        self.views.insert(bvid.to_string(), data);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn view(&self, id: &VideoId) -> Result<ViewData, Unavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.views
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| Unavailable::Request("connection refused".to_string()))
    }
}

fn collection(bvids: &[&str]) -> ViewData {
    ViewData {
        ugc_season: Some(UgcSeason {
            id: Some(1),
            title: Some("collection".to_string()),
            sections: vec![Section {
                title: None,
                episodes: bvids
                    .iter()
                    .map(|b| Episode {
                        bvid: Some(b.to_string()),
                        ..Default::default()
                    })
                    .collect(),
            }],
        }),
        ..Default::default()
    }
}

fn published(epoch: i64) -> ViewData {
    ViewData {
        pubdate: Some(serde_json::json!(epoch)),
        ..Default::default()
    }
}

struct Fixture {
    temp: TempDir,
}

impl Fixture {
    fn new(seeds: &str) -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("seeds.txt"), seeds).unwrap();
        Self { temp }
    }

    fn options(&self, after: Option<&str>) -> CollectOptions {
        CollectOptions {
            seeds: self.temp.path().join("seeds.txt"),
            output: self.output(),
            after: after.map(|s| s.parse::<DateBoundary>().unwrap()),
            concurrency: 1,
        }
    }

    fn output(&self) -> PathBuf {
        self.temp.path().join("all_urls.txt")
    }

    fn read_output(&self) -> String {
        std::fs::read_to_string(self.output()).unwrap()
    }
}

#[tokio::test]
async fn test_single_video_without_collection() {
    let fixture = Fixture::new("BV1xx411c7mD\n");
    let collector = Collector::new(FakeSource::default().with("BV1xx411c7mD", ViewData::default()));

    collector.collect(&fixture.options(None)).await.unwrap();

    assert_eq!(
        fixture.read_output(),
        "https://www.bilibili.com/video/BV1xx411c7mD\n"
    );
}

#[tokio::test]
async fn test_seed_expands_to_collection_episodes() {
    let fixture = Fixture::new("https://www.bilibili.com/video/BVseedAAAAA1?p=1\n");
    let collector = Collector::new(
        FakeSource::default().with("BVseedAAAAA1", collection(&["BVepiAAAAAA2", "BVepiAAAAAA1"])),
    );

    let report = collector.collect(&fixture.options(None)).await.unwrap();

    assert_eq!(
        fixture.read_output(),
        "https://www.bilibili.com/video/BVepiAAAAAA1\nhttps://www.bilibili.com/video/BVepiAAAAAA2\n"
    );
    assert!(!report
        .manifest
        .ids()
        .iter()
        .any(|id| id.as_str() == "BVseedAAAAA1"));
}

#[tokio::test]
async fn test_date_boundary_keeps_recent_only() {
    let fixture = Fixture::new("BVseedAAAAA1\n");
    let source = FakeSource::default()
        .with("BVseedAAAAA1", collection(&["BVoldAAAAAA1", "BVnewAAAAAA1", "BVedgeAAAAA1"]))
        .with("BVoldAAAAAA1", published(1_704_067_199))
        .with("BVnewAAAAAA1", published(1_710_000_000))
        .with("BVedgeAAAAA1", published(1_704_067_200));
    let collector = Collector::new(source);

    let report = collector
        .collect(&fixture.options(Some("2024-01-01")))
        .await
        .unwrap();

    assert_eq!(
        fixture.read_output(),
        "https://www.bilibili.com/video/BVedgeAAAAA1\nhttps://www.bilibili.com/video/BVnewAAAAAA1\n"
    );
    let dropped: Vec<&str> = report
        .partition
        .dropped
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(dropped, vec!["BVoldAAAAAA1"]);
}

#[tokio::test]
async fn test_unknown_publication_date_is_dropped() {
    let fixture = Fixture::new("BVseedAAAAA1\n");
    // Episode metadata is unavailable, so its date can't be confirmed
    let source = FakeSource::default()
        .with("BVseedAAAAA1", collection(&["BVnewAAAAAA1", "BVgoneAAAAA1", "BVnodateAAA1"]))
        .with("BVnewAAAAAA1", published(1_710_000_000))
        .with("BVnodateAAA1", ViewData::default());
    let collector = Collector::new(source);

    let report = collector
        .collect(&fixture.options(Some("2024-01-01")))
        .await
        .unwrap();

    let kept: Vec<&str> = report.manifest.ids().iter().map(|id| id.as_str()).collect();
    assert_eq!(kept, vec!["BVnewAAAAAA1"]);

    let dropped: BTreeSet<&str> = report
        .partition
        .dropped
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(dropped, BTreeSet::from(["BVgoneAAAAA1", "BVnodateAAA1"]));
    assert!(report.partition.dropped.iter().all(|r| r.published_at.is_none()));
}

#[tokio::test]
async fn test_unrecognized_lines_are_skipped() {
    let fixture = Fixture::new("# seeds\nhello world\nBV1xx411c7mD\n\nhttps://www.youtube.com/watch?v=abc\n");
    let collector = Collector::new(FakeSource::default());

    let report = collector.collect(&fixture.options(None)).await.unwrap();

    assert_eq!(report.seeds.skipped.len(), 2);
    assert_eq!(
        fixture.read_output(),
        "https://www.bilibili.com/video/BV1xx411c7mD\n"
    );
}

#[tokio::test]
async fn test_no_boundary_skips_date_lookups() {
    let fixture = Fixture::new("BVseedAAAAA1\nBV1xx411c7mD\n");
    let source = FakeSource::default()
        .with("BVseedAAAAA1", collection(&["BVepiAAAAAA1", "BVepiAAAAAA2", "BVepiAAAAAA3"]));
    let collector = Collector::new(source);

    let report = collector.collect(&fixture.options(None)).await.unwrap();

    // One request per seed for expansion, none for filtering
    assert_eq!(collector.source().calls(), 2);
    assert_eq!(report.partition.kept_ids(), report.expanded);
    assert!(report.partition.dropped.is_empty());
}

#[tokio::test]
async fn test_overlapping_seeds_produce_no_duplicates() {
    let members = ["BVepiAAAAAA1", "BVepiAAAAAA2", "BVepiAAAAAA3"];
    let fixture = Fixture::new("BVepiAAAAAA1\nBVepiAAAAAA3\nBVepiAAAAAA1\nBV1xx411c7mD\n");
    let source = FakeSource::default()
        .with("BVepiAAAAAA1", collection(&members))
        .with("BVepiAAAAAA3", collection(&members));
    let collector = Collector::new(source);

    let report = collector.collect(&fixture.options(None)).await.unwrap();

    let content = fixture.read_output();
    let lines: Vec<&str> = content.lines().collect();
    let unique: BTreeSet<&str> = lines.iter().copied().collect();
    assert_eq!(lines.len(), unique.len());
    assert_eq!(lines.len(), 4);
    assert_eq!(report.manifest.len(), 4);
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let fixture = Fixture::new("BVseedAAAAA1\nBV1xx411c7mD\n");
    let collector = Collector::new(
        FakeSource::default().with("BVseedAAAAA1", collection(&["BVepiAAAAAA3", "BVepiAAAAAA1"])),
    );

    collector.collect(&fixture.options(None)).await.unwrap();
    let first = std::fs::read(fixture.output()).unwrap();

    collector.collect(&fixture.options(None)).await.unwrap();
    let second = std::fs::read(fixture.output()).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_fetches_match_sequential() {
    let source = FakeSource::default()
        .with("BVseedAAAAA1", collection(&["BVepiAAAAAA1", "BVepiAAAAAA2"]))
        .with("BVepiAAAAAA1", published(1_710_000_000))
        .with("BVepiAAAAAA2", published(1_600_000_000))
        .with("BV1xx411c7mD", published(1_720_000_000));
    let collector = Collector::new(source);
    let seeds = SeedList::parse("BVseedAAAAA1\nBV1xx411c7mD\n");

    let fixture = Fixture::new("");
    let mut options = fixture.options(Some("2024-01-01"));
    let sequential = collector.collect_from(seeds.clone(), &options).await;
    options.concurrency = 8;
    let concurrent = collector.collect_from(seeds, &options).await;

    assert_eq!(sequential.manifest, concurrent.manifest);
    assert_eq!(sequential.partition.dropped, concurrent.partition.dropped);
    assert_eq!(
        sequential.manifest.render(),
        "https://www.bilibili.com/video/BV1xx411c7mD\nhttps://www.bilibili.com/video/BVepiAAAAAA1\n"
    );
}

#[tokio::test]
async fn test_empty_seed_file_writes_empty_manifest() {
    let fixture = Fixture::new("# nothing yet\n");
    std::fs::write(fixture.output(), "https://www.bilibili.com/video/BV1xx411c7mD\n").unwrap();
    let collector = Collector::new(FakeSource::default());

    let report = collector.collect(&fixture.options(None)).await.unwrap();

    assert!(report.manifest.is_empty());
    assert_eq!(fixture.read_output(), "");
    assert_eq!(collector.source().calls(), 0);
}

#[tokio::test]
async fn test_missing_seed_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let collector = Collector::new(FakeSource::default());

    let options = CollectOptions {
        seeds: temp.path().join("nope.txt"),
        output: temp.path().join("all_urls.txt"),
        after: None,
        concurrency: 1,
    };

    assert!(collector.collect(&options).await.is_err());
    assert!(!options.output.exists());
    assert_eq!(collector.source().calls(), 0);
}
