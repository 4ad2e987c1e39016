//! Updater behavior: throttling, change detection, purging and
//! directory rescans.

use std::fs;

use fubber_core::config::Settings;
use fubber_core::extract::ExtractorRegistry;
use fubber_core::progress::NullProgress;
use fubber_core::scanner::Scanner;
use fubber_engine::{Indexer, Updater};
use fubber_storage::queries::{entities, file_metadata, projects};
use fubber_storage::Store;

struct Fixture {
    tmp: tempfile::TempDir,
    store: Store,
    settings: Settings,
    registry: ExtractorRegistry,
}

impl Fixture {
    fn new() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/one.py"), "def one(): pass\n").unwrap();
        fs::write(tmp.path().join("src/two.py"), "def two(): pass\n").unwrap();

        let store = Store::open_in_memory().unwrap();
        projects::register(store.conn(), &tmp.path().to_string_lossy(), "fx", 0).unwrap();
        let settings = Settings::with_home(tmp.path().join("home"));
        let registry = ExtractorRegistry::with_defaults();

        let mut fixture = Fixture {
            tmp,
            store,
            settings,
            registry,
        };
        let indexer = Indexer::new(&fixture.settings, &fixture.registry);
        indexer
            .full(&mut fixture.store, fixture.tmp.path(), &mut NullProgress)
            .unwrap();
        fixture
    }

    fn root(&self) -> String {
        self.tmp.path().to_string_lossy().into_owned()
    }

    fn run_update(&mut self) -> fubber_engine::UpdateOutcome {
        let project = projects::get(self.store.conn(), &self.root())
            .unwrap()
            .unwrap();
        let scanner = Scanner::new(self.tmp.path());
        let updater = Updater::new(&self.settings, &self.registry);
        updater
            .run(
                &mut self.store,
                &project,
                scanner.matcher(),
                &mut NullProgress,
            )
            .unwrap()
    }

    /// Make a stored file look older than its on-disk mtime.
    fn backdate(&self, rel: &str) {
        let path = self.tmp.path().join(rel);
        self.store
            .conn()
            .execute(
                "UPDATE file_metadata SET filetime = filetime - 100 WHERE filename = ?1",
                [path.to_string_lossy()],
            )
            .unwrap();
    }
}

#[test]
fn second_run_within_throttle_is_suppressed() {
    let mut fx = Fixture::new();

    let first = fx.run_update();
    assert!(!first.throttled);

    // last_update_check was just written; the default 60s throttle
    // suppresses the second sweep.
    let second = fx.run_update();
    assert!(second.throttled);
    assert_eq!(second.checked, 0);
}

#[test]
fn unchanged_project_only_updates_bookkeeping() {
    let mut fx = Fixture::new();
    let outcome = fx.run_update();
    assert!(!outcome.throttled);
    assert_eq!(outcome.reindexed, 0);
    assert_eq!(outcome.purged, 0);
    assert_eq!(outcome.checked, 2);

    let project = projects::get(fx.store.conn(), &fx.root()).unwrap().unwrap();
    assert!(project.last_update_check.is_some());
}

#[test]
fn modified_file_is_reindexed() {
    let mut fx = Fixture::new();
    fs::write(
        fx.tmp.path().join("src/one.py"),
        "def one(): pass\n\ndef one_more(): pass\n",
    )
    .unwrap();
    fx.backdate("src/one.py");

    let outcome = fx.run_update();
    assert_eq!(outcome.reindexed, 1);

    let names: Vec<String> = fx
        .store
        .conn()
        .prepare("SELECT name FROM code_entities WHERE type = 'function' ORDER BY name")
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert!(names.contains(&"one_more".to_string()));
}

#[test]
fn deleted_file_is_purged() {
    let mut fx = Fixture::new();
    let victim = fx.tmp.path().join("src/two.py");
    fs::remove_file(&victim).unwrap();

    let outcome = fx.run_update();
    assert_eq!(outcome.purged, 1);
    assert!(file_metadata::get(fx.store.conn(), &victim.to_string_lossy())
        .unwrap()
        .is_none());
    assert_eq!(
        entities::count_for_file(fx.store.conn(), &victim.to_string_lossy()).unwrap(),
        0
    );
    assert_eq!(
        entities::count(fx.store.conn()).unwrap(),
        entities::count_index(fx.store.conn()).unwrap()
    );
}

#[test]
fn newly_ignored_file_is_purged() {
    let mut fx = Fixture::new();
    fs::write(fx.tmp.path().join(".gitignore"), "src/two.py\n").unwrap();

    let outcome = fx.run_update();
    assert_eq!(outcome.purged, 1);
    let remaining = file_metadata::filenames_for_project(fx.store.conn(), &fx.root()).unwrap();
    assert!(!remaining.iter().any(|f| f.ends_with("two.py")));
}

#[test]
fn new_sibling_of_changed_file_is_discovered() {
    let mut fx = Fixture::new();

    // A change next to a brand-new file: the rescan picks up the
    // neighbor the index has never seen.
    fs::write(
        fx.tmp.path().join("src/one.py"),
        "def one(): pass\n\ndef extra(): pass\n",
    )
    .unwrap();
    fx.backdate("src/one.py");
    fs::write(fx.tmp.path().join("src/three.py"), "def three(): pass\n").unwrap();

    let outcome = fx.run_update();
    assert_eq!(outcome.reindexed, 2);

    let three = fx.tmp.path().join("src/three.py");
    assert!(file_metadata::get(fx.store.conn(), &three.to_string_lossy())
        .unwrap()
        .is_some());
}

#[test]
fn incremental_equals_full_after_update(){
    let mut fx = Fixture::new();
    fs::write(
        fx.tmp.path().join("src/one.py"),
        "class Tool:\n    def run(self): pass\n",
    )
    .unwrap();
    fx.backdate("src/one.py");
    fx.run_update();

    let snapshot = |store: &Store| -> Vec<(String, String, u32, u32)> {
        let mut rows: Vec<(String, String, u32, u32)> = store
            .conn()
            .prepare("SELECT type, name, line_start, line_end FROM code_entities")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        rows.sort();
        rows
    };

    let mut fresh = Store::open_in_memory().unwrap();
    projects::register(fresh.conn(), &fx.root(), "fx", 0).unwrap();
    let indexer = Indexer::new(&fx.settings, &fx.registry);
    indexer
        .full(&mut fresh, fx.tmp.path(), &mut NullProgress)
        .unwrap();

    assert_eq!(snapshot(&fx.store), snapshot(&fresh));
}

#[test]
fn update_respects_ignore_rules_for_new_files() {
    let mut fx = Fixture::new();
    fs::create_dir_all(fx.tmp.path().join("src/__pycache__")).unwrap();
    fs::write(
        fx.tmp.path().join("src/one.py"),
        "def one(): pass\ndef tweaked(): pass\n",
    )
    .unwrap();
    fx.backdate("src/one.py");
    fs::write(
        fx.tmp.path().join("src/__pycache__/junk.py"),
        "cached = True\n",
    )
    .unwrap();

    fx.run_update();
    let files = file_metadata::filenames_for_project(fx.store.conn(), &fx.root()).unwrap();
    assert!(!files.iter().any(|f| f.contains("__pycache__")));
}

#[test]
fn borrowed_matcher_reflects_current_rules() {
    // The matcher handed to the updater is the one discovery built; a
    // path excluded by it never survives a sweep.
    let fx = Fixture::new();
    let scanner = Scanner::new(fx.tmp.path());
    let matcher = scanner.matcher();
    assert!(matcher.is_ignored(&fx.tmp.path().join("node_modules/x.js"), false));
    assert!(!matcher.is_ignored(&fx.tmp.path().join("src/one.py"), false));
}
