//! Integration tests for guessing tasks and entities back from paths.

use file_tree::builder::{PathBuilder, PathParams};
use file_tree::directory::{EntityDirectory, Fixture, InMemoryDirectory};
use file_tree::error::ErrorCode;
use file_tree::parser::{GuessMatch, PathParser, ResolvedToken};
use file_tree::render::{RenderOptions, Renderer, StaticDefaults};
use file_tree::token::TokenType;
use file_tree::tree::{TreeDefinition, TreeStore};
use file_tree::types::{Project, Task};

const TREE_TASK_ID: &str = "8b4f9c2e-1d3a-4e5b-9f6c-7a8b9c0d1e2f";

/// Tree with episodes in every temporal path, used for the `Cosmos Landromat` project.
const EPISODIC_TREE: &str = r#"{
    "working": {
        "mountpoint": "/prod",
        "root": "wip",
        "folder_path": {
            "shot": "<Project>/<Episode>/shots/<Sequence>/<Shot>/<TaskType>",
            "scene": "<Project>/<Episode>/scenes/<Sequence>/<Scene>/<TaskType>",
            "asset": "<Project>/assets/<AssetType>/<Asset>/<TaskType>",
            "style": "lowercase"
        },
        "file_name": {
            "shot": "<Episode>_<Sequence>_<Shot>_<TaskType>",
            "style": "lowercase"
        }
    },
    "output": {
        "mountpoint": "/prod",
        "root": "out",
        "folder_path": {
            "shot": "<Project>/<Episode>/shots/<Sequence>/<Shot>/<OutputType>/v<Version>",
            "style": "lowercase"
        },
        "file_name": {
            "shot": "<Shot>_v<Version>",
            "style": "lowercase"
        }
    }
}"#;

fn directory() -> InMemoryDirectory {
    let fixture: Fixture = serde_json::from_str(include_str!("fixtures/production.json"))
        .expect("fixture should parse");
    let mut dir = InMemoryDirectory::from_fixture(fixture);
    let episodic = TreeDefinition::from_json_str("episodic", EPISODIC_TREE).unwrap();
    dir.set_project_tree("p-cosmos", episodic).unwrap();
    dir
}

fn default_tree() -> TreeDefinition {
    TreeStore::new(None).load_tree("default").unwrap()
}

fn project(dir: &InMemoryDirectory, id: &str) -> Project {
    dir.project(id).unwrap().expect("project in fixture")
}

fn task(dir: &InMemoryDirectory, id: &str) -> Task {
    dir.fixture()
        .tasks
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .expect("task in fixture")
}

fn guess_task(dir: &InMemoryDirectory, path: &str, project_id: &str) -> file_tree::TreeResult<Task> {
    let fallback = default_tree();
    let parser = PathParser::new(dir).with_fallback_tree(&fallback);
    parser.guess_shot_task_from_path(path, &project(dir, project_id), "working", "/")
}

fn guesses(dir: &InMemoryDirectory, project_id: &str, path: &str) -> Vec<GuessMatch> {
    let fallback = default_tree();
    let parser = PathParser::new(dir).with_fallback_tree(&fallback);
    parser.guess_from_path(project_id, path, "/").unwrap()
}

fn id(value: &str) -> ResolvedToken {
    ResolvedToken::Id(value.to_string())
}

mod round_trip_tests {
    use super::*;

    fn working_folder(dir: &InMemoryDirectory, task: &Task) -> String {
        let fallback = default_tree();
        let defaults = StaticDefaults::default();
        let renderer = Renderer::new(dir, &defaults, RenderOptions::default());
        let builder = PathBuilder::new(renderer).with_fallback_tree(&fallback);
        builder
            .working_folder_path(task, &PathParams::working().with_sep("/"))
            .unwrap()
    }

    #[test]
    fn shot_folder_resolves_to_its_task() {
        let dir = directory();
        let task = task(&dir, "bb-sh01-anim");
        let folder = working_folder(&dir, &task);

        let fallback = default_tree();
        let parser = PathParser::new(&dir).with_fallback_tree(&fallback);
        let guessed = parser
            .guess_shot_task_from_path(&folder, &project(&dir, "p-bb"), "working", "/")
            .unwrap();

        assert_eq!(guessed, task);
    }

    #[test]
    fn asset_folder_resolves_to_its_task() {
        let dir = directory();
        let task = task(&dir, TREE_TASK_ID);
        let folder = working_folder(&dir, &task);

        let fallback = default_tree();
        let parser = PathParser::new(&dir).with_fallback_tree(&fallback);
        let guessed = parser
            .guess_asset_task_from_path(&folder, &project(&dir, "p-bb"), "working", "/")
            .unwrap();

        assert_eq!(guessed.id, TREE_TASK_ID);
    }

    #[test]
    fn episodic_shot_folder_resolves_within_its_episode() {
        let dir = directory();
        for task_id in ["cl-e01-sh01-anim", "cl-e02-sh01-anim"] {
            let task = task(&dir, task_id);
            let folder = working_folder(&dir, &task);
            assert_eq!(guess_task(&dir, &folder, "p-cosmos").unwrap().id, task_id);
        }
    }

    #[test]
    fn trailing_separator_is_ignored() {
        let dir = directory();
        let task = task(&dir, "bb-sh01-anim");
        let folder = format!("{}/", working_folder(&dir, &task));

        assert_eq!(guess_task(&dir, &folder, "p-bb").unwrap().id, "bb-sh01-anim");
    }
}

mod strict_guess_tests {
    use super::*;

    #[test]
    fn names_match_case_insensitively() {
        let dir = directory();
        for shot in ["Shot01", "shot01", "SHOT01"] {
            let path = format!("/prod/wip/cosmos_landromat/E01/shots/S01/{}/Animation", shot);
            assert_eq!(
                guess_task(&dir, &path, "p-cosmos").unwrap().id,
                "cl-e01-sh01-anim"
            );
        }
    }

    #[test]
    fn missing_segment_is_wrong_format() {
        let dir = directory();
        let err = guess_task(&dir, "/prod/wip/cosmos_landromat/e01/shots/s01/animation", "p-cosmos")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::WrongPathFormat);
    }

    #[test]
    fn path_outside_root_is_wrong_format() {
        let dir = directory();
        let err = guess_task(
            &dir,
            "/elsewhere/wip/cosmos_landromat/e01/shots/s01/shot01/animation",
            "p-cosmos",
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::WrongPathFormat);
    }

    #[test]
    fn literal_mismatch_is_wrong_format() {
        let dir = directory();
        let err = guess_task(
            &dir,
            "/prod/wip/cosmos_landromat/e01/scenes/s01/shot01/animation",
            "p-cosmos",
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::WrongPathFormat);
    }

    #[test]
    fn unknown_names_raise_specific_errors() {
        let dir = directory();
        let cases = [
            ("/prod/wip/cosmos_landromat/e09/shots/s01/shot01/animation", ErrorCode::EpisodeNotFound),
            ("/prod/wip/cosmos_landromat/e01/shots/s09/shot01/animation", ErrorCode::SequenceNotFound),
            ("/prod/wip/cosmos_landromat/e01/shots/s01/shot99/animation", ErrorCode::ShotNotFound),
            ("/prod/wip/cosmos_landromat/e01/shots/s01/shot01/lighting", ErrorCode::TaskTypeNotFound),
            ("/prod/wip/cosmos_landromat/e01/shots/s01/shot01/layout", ErrorCode::TaskNotFound),
        ];
        for (path, code) in cases {
            let err = guess_task(&dir, path, "p-cosmos").unwrap_err();
            assert_eq!(err.code, code, "for {}", path);
        }
    }

    #[test]
    fn unknown_asset_type_is_reported() {
        let dir = directory();
        let fallback = default_tree();
        let parser = PathParser::new(&dir).with_fallback_tree(&fallback);
        let err = parser
            .guess_asset_task_from_path(
                "/productions/working/big_buck/assets/vehicles/tree/modeling",
                &project(&dir, "p-bb"),
                "working",
                "/",
            )
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AssetTypeNotFound);
    }
}

mod best_effort_tests {
    use super::*;

    #[test]
    fn episodic_shot_path_resolves_fully() {
        let dir = directory();
        let found = guesses(
            &dir,
            "p-cosmos",
            "/prod/wip/cosmos_landromat/e01/shots/s01/shot01/animation",
        );

        assert_eq!(found.len(), 1);
        let guess = &found[0];
        assert_eq!(guess.mode, "working");
        assert_eq!(guess.template, "shot");
        assert!(guess.complete);
        assert_eq!(guess.get(TokenType::Project), Some(&id("p-cosmos")));
        assert_eq!(guess.get(TokenType::Episode), Some(&id("cl-e01")));
        assert_eq!(guess.get(TokenType::Sequence), Some(&id("cl-e01-s01")));
        assert_eq!(guess.get(TokenType::Shot), Some(&id("cl-e01-s01-sh01")));
        assert_eq!(guess.get(TokenType::TaskType), Some(&id("tt-anim")));
    }

    #[test]
    fn scene_resolves_under_its_sequence() {
        let dir = directory();
        let found = guesses(
            &dir,
            "p-cosmos",
            "/prod/wip/cosmos_landromat/e01/scenes/s01/sc01/layout",
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].template, "scene");
        assert!(found[0].complete);
        assert_eq!(found[0].get(TokenType::Scene), Some(&id("cl-e01-s01-sc01")));
    }

    #[test]
    fn output_path_reads_free_values_and_version() {
        let dir = directory();
        let found = guesses(
            &dir,
            "p-cosmos",
            "/prod/out/cosmos_landromat/e02/shots/s01/shot01/geometry/v003",
        );

        assert_eq!(found.len(), 1);
        let guess = &found[0];
        assert_eq!(guess.mode, "output");
        assert!(guess.complete);
        assert_eq!(guess.get(TokenType::Shot), Some(&id("cl-e02-s01-sh01")));
        assert_eq!(
            guess.get(TokenType::OutputType),
            Some(&ResolvedToken::Value("geometry".into()))
        );
        assert_eq!(guess.get(TokenType::Version), Some(&ResolvedToken::Version(3)));
    }

    #[test]
    fn unknown_name_keeps_resolved_prefix() {
        let dir = directory();
        let found = guesses(
            &dir,
            "p-cosmos",
            "/prod/wip/cosmos_landromat/e01/shots/s01/shot99/animation",
        );

        assert_eq!(found.len(), 1);
        let guess = &found[0];
        assert!(!guess.complete);
        assert_eq!(guess.get(TokenType::Sequence), Some(&id("cl-e01-s01")));
        assert_eq!(guess.get(TokenType::Shot), None);
        assert_eq!(guess.get(TokenType::TaskType), None);
    }

    #[test]
    fn sequence_without_episode_stops_after_project() {
        // The default tree has no episode level, so sequences lack their prerequisite.
        let dir = directory();
        let found = guesses(
            &dir,
            "p-bb",
            "/productions/working/big_buck/shots/s01/sh01/animation",
        );

        assert_eq!(found.len(), 1);
        let guess = &found[0];
        assert_eq!(guess.template, "shot");
        assert!(!guess.complete);
        assert_eq!(guess.values.len(), 1);
        assert_eq!(guess.get(TokenType::Project), Some(&id("p-bb")));
    }

    #[test]
    fn mismatched_segments_are_skipped() {
        let dir = directory();
        let found = guesses(&dir, "p-cosmos", "/prod/wip/cosmos_landromat/e01/shots/s01/animation");
        assert!(found.iter().all(|g| g.template != "shot"));
    }

    #[test]
    fn path_outside_every_root_has_no_match() {
        let dir = directory();
        assert!(guesses(&dir, "p-cosmos", "/tmp/cosmos_landromat/e01").is_empty());
    }

    #[test]
    fn asset_path_resolves_asset_type_first() {
        let dir = directory();
        let found = guesses(
            &dir,
            "p-bb",
            "/productions/working/big_buck/assets/props/tree/modeling",
        );

        let guess = found
            .iter()
            .find(|g| g.template == "asset")
            .expect("asset template should match");
        assert!(guess.complete);
        assert_eq!(guess.get(TokenType::AssetType), Some(&id("et-props")));
        assert_eq!(guess.get(TokenType::Asset), Some(&id("bb-tree")));
        assert_eq!(guess.get(TokenType::TaskType), Some(&id("tt-model")));
    }

    #[test]
    fn unknown_project_is_an_error() {
        let dir = directory();
        let fallback = default_tree();
        let parser = PathParser::new(&dir).with_fallback_tree(&fallback);
        let err = parser
            .guess_from_path("p-missing", "/prod/wip/x", "/")
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProjectNotFound);
    }

    #[test]
    fn guesses_serialize_with_token_names() {
        let dir = directory();
        let found = guesses(
            &dir,
            "p-cosmos",
            "/prod/out/cosmos_landromat/e02/shots/s01/shot01/geometry/v003",
        );
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json[0]["values"]["Version"], 3);
        assert_eq!(json[0]["values"]["Episode"], "cl-e02");
    }
}

mod resolver_tests {
    use super::*;
    use file_tree::types::AssetInstance;

    /// One working mode with a template per resolver under test.
    const RESOLVER_TREE: &str = r#"{
        "working": {
            "mountpoint": "/prod",
            "root": "wip",
            "folder_path": {
                "shot_task": "<Project>/<Episode>/<Sequence>/<Shot>/<TaskType>/<Task>",
                "orphan_task": "<Project>/tasks/<TaskType>/<Task>",
                "instance": "<Project>/<Episode>/instances/<Instance>",
                "loose_instance": "<Project>/loose/<Instance>",
                "temporal": "<Project>/temporal/<TemporalEntityType>/<TemporalEntity>",
                "untyped": "<Project>/untyped/<TemporalEntity>",
                "style": "lowercase"
            },
            "file_name": {
                "style": "lowercase"
            }
        }
    }"#;

    fn resolver_directory() -> InMemoryDirectory {
        let mut dir = directory();
        let tree = TreeDefinition::from_json_str("resolvers", RESOLVER_TREE).unwrap();
        dir.set_project_tree("p-cosmos", tree).unwrap();
        dir.add_asset_instance(AssetInstance {
            id: "cl-ai-rabbit".into(),
            asset_id: "bb-rabbit".into(),
            name: None,
            number: 1,
            target_asset_id: None,
            scene_id: Some("cl-e01-s01-sh01".into()),
        });
        dir
    }

    fn single(dir: &InMemoryDirectory, path: &str, template: &str) -> GuessMatch {
        let found = guesses(dir, "p-cosmos", path);
        let matching: Vec<&GuessMatch> = found.iter().filter(|g| g.template == template).collect();
        assert_eq!(matching.len(), 1, "expected one {} match, got {:?}", template, found);
        matching[0].clone()
    }

    #[test]
    fn task_resolves_under_its_shot() {
        let dir = resolver_directory();
        let guess = single(
            &dir,
            "/prod/wip/cosmos_landromat/e01/s01/shot01/animation/main",
            "shot_task",
        );

        assert!(guess.complete);
        assert_eq!(guess.get(TokenType::Shot), Some(&id("cl-e01-s01-sh01")));
        assert_eq!(guess.get(TokenType::Task), Some(&id("cl-e01-sh01-anim")));
    }

    #[test]
    fn task_without_owner_stops_after_task_type() {
        let dir = resolver_directory();
        let guess = single(&dir, "/prod/wip/cosmos_landromat/tasks/animation/main", "orphan_task");

        assert!(!guess.complete);
        assert_eq!(guess.get(TokenType::TaskType), Some(&id("tt-anim")));
        assert_eq!(guess.get(TokenType::Task), None);
        assert_eq!(guess.values.len(), 2);
    }

    #[test]
    fn instance_resolves_within_its_episode() {
        let dir = resolver_directory();
        let guess = single(&dir, "/prod/wip/cosmos_landromat/e01/instances/0001", "instance");

        assert!(guess.complete);
        assert_eq!(guess.get(TokenType::Instance), Some(&id("cl-ai-rabbit")));
    }

    #[test]
    fn instance_outside_episode_is_not_found() {
        let dir = resolver_directory();
        let guess = single(&dir, "/prod/wip/cosmos_landromat/e02/instances/0001", "instance");

        assert!(!guess.complete);
        assert_eq!(guess.get(TokenType::Episode), Some(&id("cl-e02")));
        assert_eq!(guess.get(TokenType::Instance), None);
    }

    #[test]
    fn instance_without_episode_stops_after_project() {
        let dir = resolver_directory();
        let guess = single(&dir, "/prod/wip/cosmos_landromat/loose/0001", "loose_instance");

        assert!(!guess.complete);
        assert_eq!(guess.values.len(), 1);
        assert_eq!(guess.get(TokenType::Project), Some(&id("p-cosmos")));
    }

    #[test]
    fn temporal_entity_resolves_by_type() {
        let dir = resolver_directory();
        let guess = single(&dir, "/prod/wip/cosmos_landromat/temporal/scene/sc01", "temporal");

        assert!(guess.complete);
        assert_eq!(guess.get(TokenType::TemporalEntityType), Some(&id("et-scene")));
        assert_eq!(
            guess.get(TokenType::TemporalEntity),
            Some(&id("cl-e01-s01-sc01"))
        );
    }

    #[test]
    fn temporal_entity_without_type_stops_after_project() {
        let dir = resolver_directory();
        let guess = single(&dir, "/prod/wip/cosmos_landromat/untyped/shot01", "untyped");

        assert!(!guess.complete);
        assert_eq!(guess.values.len(), 1);
        assert_eq!(guess.get(TokenType::TemporalEntity), None);
    }

    #[test]
    fn modes_sharing_a_root_report_one_match() {
        let mut dir = directory();
        let tree = TreeDefinition::from_json_str(
            "shared",
            r#"{
                "working": {
                    "mountpoint": "/prod", "root": "shared",
                    "folder_path": { "asset": "<Project>/<AssetType>/<Asset>", "style": "lowercase" },
                    "file_name": { "style": "lowercase" }
                },
                "output": {
                    "mountpoint": "/prod", "root": "shared",
                    "folder_path": { "asset": "<Project>/<AssetType>/<Asset>", "style": "lowercase" },
                    "file_name": { "style": "lowercase" }
                }
            }"#,
        )
        .unwrap();
        dir.set_project_tree("p-bb", tree).unwrap();

        let found = guesses(&dir, "p-bb", "/prod/shared/big_buck/props/tree");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get(TokenType::Asset), Some(&id("bb-tree")));
    }
}
