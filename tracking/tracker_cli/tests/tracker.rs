#[macro_use]
extern crate util;

pub mod common;

mod repair_sequence_1 {
    use std::fs::{read_to_string, write};
    use std::path::PathBuf;

    use assert_cmd::Command;
    use indoc::indoc;
    use predicates::prelude::*;
    use tempfile::tempdir;
    use util::test::{build_temp_file, prepare_args, print};

    use crate::common::{read_json, uploaded_photo_path, write_photo};

    /// A context, which will be dropped when the tests are completed.
    mod context {
        use std::fs;
        use std::path::Path;
        use std::sync::{Mutex, MutexGuard};
        use std::thread::sleep;
        use std::time::Duration;

        use super::*;

        #[derive(Debug)]
        pub struct Context {
            pub temp_dir: tempfile::TempDir,

            pub trace_log_arg: String,
            pub path_arg: String,
            pub project_arg: String,
            pub test_trace_log_path: PathBuf,
            pub test_project_path: PathBuf,
            pub test_repairs_path: PathBuf,
            pub test_config_path: PathBuf,
            pub camera_path: PathBuf,
        }

        impl Context {
            pub fn new() -> Self {
                let temp_dir = tempdir().unwrap();

                let path_arg = format!("--path {}", temp_dir.path().to_str().unwrap());

                let (test_trace_log_path, _test_trace_log_file_name) = build_temp_file(&temp_dir, "trace", "log");
                let trace_log_arg = format!("--trace {}", test_trace_log_path.to_str().unwrap());

                let (test_project_path, _test_project_file_name) =
                    build_temp_file(&temp_dir, "project-tower", "facade.json");
                let (test_repairs_path, _test_repairs_file_name) =
                    build_temp_file(&temp_dir, "repairs-tower", "facade.json");
                let (test_config_path, _test_config_file_name) = build_temp_file(&temp_dir, "tracker", "json");

                let project_arg = "--project tower".to_string();

                let mut camera_path = PathBuf::from(temp_dir.path());
                camera_path.push("camera");
                fs::create_dir_all(&camera_path).unwrap();

                Context {
                    temp_dir,
                    path_arg,
                    project_arg,
                    trace_log_arg,
                    test_trace_log_path,
                    test_project_path,
                    test_repairs_path,
                    test_config_path,
                    camera_path,
                }
            }

            pub fn delete_trace_log(&self) {
                if Path::new(&self.test_trace_log_path).exists() {
                    println!(
                        "deleting trace log: {}",
                        self.test_trace_log_path
                            .to_str()
                            .unwrap()
                    );
                    fs::remove_file(&self.test_trace_log_path).unwrap();
                }
            }
        }

        impl Drop for Context {
            fn drop(&mut self) {
                println!(
                    "destroying context. temp_dir: {}",
                    self.temp_dir.path().to_str().unwrap()
                );
            }
        }

        /// IMPORTANT: lock content must be dropped manually, as static items are never dropped.
        static LOCK: Mutex<(usize, Option<Context>)> = Mutex::new((0, None));

        /// Tests share the files of one project, so they run one at a time, in sequence order.
        pub fn acquire(sequence: usize) -> MutexGuard<'static, (usize, Option<Context>)> {
            let mut lock = loop {
                let mut lock = LOCK
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                if lock.0 == sequence - 1 {
                    lock.0 += 1;
                    break lock;
                }
                drop(lock);

                sleep(Duration::from_millis(100));
            };

            if lock.1.is_none() {
                lock.1.replace(Context::new());
            }

            lock
        }
    }

    fn tracker_cli() -> Command {
        Command::new(env!("CARGO_BIN_EXE_tracker_cli"))
    }

    #[test]
    fn sequence_01_create_project() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(1);
        let ctx = ctx_guard.1.as_mut().unwrap();

        // and
        let args = prepare_args(vec![
            ctx.trace_log_arg.as_str(),
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "-vvv",
            "create",
            "--elevation North:5:10",
            "--elevation South:3:6",
            "--repair-type CR:3:m3:950",
            "--repair-type PR:4:m2:85:40",
        ]);
        println!("args: {:?}", args);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(print("stdout"));

        // and
        let trace_content: String = read_to_string(ctx.test_trace_log_path.clone())?;
        println!("{}", trace_content);

        assert_contains_inorder!(trace_content, [
            "Created project. name: 'tower', elevations: [North (drops: 5, levels: 10), South (drops: 3, levels: 6)], total_drops: 8",
            "Added repair type. code: 'CR', phases: 3, unit_to_charge: 'm3', unit_price: 950",
            "Added repair type. code: 'PR', phases: 4, unit_to_charge: 'm2', unit_price: 85",
            "Saved project.",
        ]);

        // and
        let project = read_json(&ctx.test_project_path);
        assert_eq!(project["name"], "tower");
        assert_eq!(project["elevations"][1]["name"], "South");
        assert_eq!(project["elevations"][1]["drops"], 3);
        assert_eq!(project["repair_types"][1]["code"], "PR");
        assert_eq!(project["repair_types"][1]["minimum_charge"], "40");

        Ok(())
    }

    #[test]
    fn sequence_02_resolve_elevations() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(2);
        let ctx = ctx_guard.1.as_mut().unwrap();

        for (drop_and_level, expected_stdout) in [
            (vec!["--drop 6"], "South\n"),
            (vec!["--drop 9"], "no-data\n"),
            (vec!["--drop 7", "--level 6"], "South valid\n"),
            (vec!["--drop 7", "--level 7"], "South invalid\n"),
        ] {
            // and
            let mut args = vec![ctx.path_arg.as_str(), ctx.project_arg.as_str(), "resolve"];
            args.extend(drop_and_level);
            let args = prepare_args(args);
            println!("args: {:?}", args);

            // when
            tracker_cli()
                .args(args)
                // then
                .assert()
                .success()
                .stderr(print("stderr"))
                .stdout(predicate::str::diff(expected_stdout));
        }

        Ok(())
    }

    #[test]
    fn sequence_03_build_code() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(3);
        let ctx = ctx_guard.1.as_mut().unwrap();

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "code",
            "--drop 5",
            "--level 3",
            "--repair-type CR",
            "--measure width=100",
            "--measure height=100",
            "--phase S",
        ]);
        println!("args: {:?}", args);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(predicate::str::diff("D5.L3.CR.1.100x100x40.S\n"));

        Ok(())
    }

    #[test]
    fn sequence_04_survey() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(4);
        let ctx = ctx_guard.1.as_mut().unwrap();
        ctx.delete_trace_log();

        // and
        let photo_path = write_photo(&ctx.camera_path, "IMG_0001.jpg");
        let photo_arg = format!("--photo {}", photo_path.to_str().unwrap());

        // and
        let args = prepare_args(vec![
            ctx.trace_log_arg.as_str(),
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "-vvv",
            "survey",
            "--drop 5",
            "--level 3",
            "--repair-type CR",
            "--author ada",
            "--measure width=100",
            "--measure height=100",
            photo_arg.as_str(),
            "--comments spalling above the window head",
        ]);
        println!("args: {:?}", args);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(predicate::str::diff("D5.L3.CR.1.100x100x40.S\n"));

        // and
        let trace_content: String = read_to_string(ctx.test_trace_log_path.clone())?;
        println!("{}", trace_content);

        assert_contains_inorder!(trace_content, [
            "Loaded project. name: 'tower'",
            "Stored photo.",
            "original_filename: 'IMG_0001.jpg'",
            "Created repair.",
            "repair: 'D5.L3.CR.1'",
            "Submitted repair phase. code: 'D5.L3.CR.1.100x100x40.S', phase: S, status: InProgress",
        ]);

        // and
        let uploaded_path = uploaded_photo_path(ctx.temp_dir.path(), "tower", "D5.L3.CR.1.100x100x40.S.jpg");
        assert!(uploaded_path.exists());

        // and
        let repairs = read_json(&ctx.test_repairs_path);
        assert_eq!(repairs[0]["elevation_name"], "North");
        assert_eq!(repairs[0]["repair_index"], 1);
        assert_eq!(repairs[0]["status"], "in_progress");
        assert_eq!(repairs[0]["phases"]["survey"]["author"], "ada");
        assert_eq!(repairs[0]["phases"]["survey"]["comments"], "spalling above the window head");
        assert_eq!(
            repairs[0]["phases"]["survey"]["photos"][0],
            format!("file://{}", uploaded_path.display())
        );

        Ok(())
    }

    #[test]
    fn sequence_05_survey_outside_the_facade() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(5);
        let ctx = ctx_guard.1.as_mut().unwrap();

        // and
        let photo_path = write_photo(&ctx.camera_path, "IMG_0002.jpg");
        let photo_arg = format!("--photo {}", photo_path.to_str().unwrap());

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "survey",
            "--drop 7",
            "--level 8",
            "--repair-type CR",
            "--author ada",
            "--measure width=100",
            "--measure height=100",
            photo_arg.as_str(),
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Level is out of range [1..6] (inclusive). drop: 7, level: 8, elevation: 'South'",
            ));

        // and
        let repairs = read_json(&ctx.test_repairs_path);
        assert_eq!(repairs.as_array().unwrap().len(), 1);

        Ok(())
    }

    #[test]
    fn sequence_06_finish_before_progress() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(6);
        let ctx = ctx_guard.1.as_mut().unwrap();

        // and
        let photo_path = write_photo(&ctx.camera_path, "IMG_0003.jpg");
        let photo_arg = format!("--photo {}", photo_path.to_str().unwrap());

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "finish",
            "--repair D5.L3.CR.1",
            "--author ada",
            photo_arg.as_str(),
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "Phase is out of sequence. repair: 'D5.L3.CR.1', expected: P1, requested: F",
            ));

        // and
        let uploaded_path = uploaded_photo_path(ctx.temp_dir.path(), "tower", "D5.L3.CR.1.100x100x40.F.jpg");
        assert!(!uploaded_path.exists());

        Ok(())
    }

    #[test]
    fn sequence_07_progress() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(7);
        let ctx = ctx_guard.1.as_mut().unwrap();
        ctx.delete_trace_log();

        // and
        let photo_path = write_photo(&ctx.camera_path, "IMG_0004.jpg");
        let photo_arg = format!("--photo {}", photo_path.to_str().unwrap());

        // and
        let args = prepare_args(vec![
            ctx.trace_log_arg.as_str(),
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "-vvv",
            "progress",
            "--repair D5.L3.CR.1",
            "--author ada",
            "--measure width=120",
            photo_arg.as_str(),
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(predicate::str::diff("D5.L3.CR.1.120x100x40.P1\n"));

        // and
        let trace_content: String = read_to_string(ctx.test_trace_log_path.clone())?;
        println!("{}", trace_content);

        assert_contains_inorder!(trace_content, [
            "Stored photo.",
            "Applied repair phase. repair: 'D5.L3.CR.1', phase: P1, status: InProgress",
            "Updated repair.",
            "Submitted repair phase. code: 'D5.L3.CR.1.120x100x40.P1', phase: P1, status: InProgress",
        ]);

        // and
        let repairs = read_json(&ctx.test_repairs_path);
        assert_eq!(repairs[0]["phases"]["progress"][0]["measurements"]["width"], "120");
        assert_eq!(repairs[0]["phases"]["progress"][0]["measurements"]["height"], "100");

        Ok(())
    }

    #[test]
    fn sequence_08_finish_with_the_default_author() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(8);
        let ctx = ctx_guard.1.as_mut().unwrap();
        ctx.delete_trace_log();

        // and
        write(&ctx.test_config_path, indoc! {r#"
            {
                "default_author": "bea"
            }
        "#})?;

        // and
        let first_photo_path = write_photo(&ctx.camera_path, "IMG_0005.jpg");
        let second_photo_path = write_photo(&ctx.camera_path, "IMG_0006.jpg");
        let first_photo_arg = format!("--photo {}", first_photo_path.to_str().unwrap());
        let second_photo_arg = format!("--photo {}", second_photo_path.to_str().unwrap());

        // and
        let args = prepare_args(vec![
            ctx.trace_log_arg.as_str(),
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "-vvv",
            "finish",
            "--repair D5.L3.CR.1",
            first_photo_arg.as_str(),
            second_photo_arg.as_str(),
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(predicate::str::diff("D5.L3.CR.1.120x100x40.F\n"));

        // and
        let trace_content: String = read_to_string(ctx.test_trace_log_path.clone())?;
        println!("{}", trace_content);

        assert_contains_inorder!(trace_content, [
            "Loaded tracker config.",
            "Submitted repair phase. code: 'D5.L3.CR.1.120x100x40.F', phase: F, status: Complete",
        ]);

        // and
        for file_name in ["D5.L3.CR.1.120x100x40.F_1.jpg", "D5.L3.CR.1.120x100x40.F_2.jpg"] {
            assert!(uploaded_photo_path(ctx.temp_dir.path(), "tower", file_name).exists());
        }

        // and
        let repairs = read_json(&ctx.test_repairs_path);
        assert_eq!(repairs[0]["status"], "complete");
        assert_eq!(repairs[0]["phases"]["finish"]["author"], "bea");
        assert_eq!(
            repairs[0]["phases"]["finish"]["photos"]
                .as_array()
                .unwrap()
                .len(),
            2
        );

        Ok(())
    }

    #[test]
    fn sequence_09_status() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(9);
        let ctx = ctx_guard.1.as_mut().unwrap();

        // and
        let args = prepare_args(vec![ctx.path_arg.as_str(), ctx.project_arg.as_str(), "status"]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(predicate::str::contains(
                "D5.L3.CR.1 North Complete Complete (survey: yes, progress: 1/1, finish: yes) quantity: 0.00048 m3",
            ));

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "status",
            "--repair D5.L3.CR.1",
            "--format json",
        ]);

        // when
        let output = tracker_cli()
            .args(args)
            .output()?;

        // then
        assert!(output.status.success());
        let views: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(views[0]["repair"], "D5.L3.CR.1");
        assert_eq!(views[0]["status"], "complete");
        assert_eq!(views[0]["phases"]["progress_count"], 1);
        assert_eq!(views[0]["phases"]["is_complete"], true);
        assert_eq!(views[0]["quantity"], "0.00048");

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "status",
            "--repair D1.L1.CR.1",
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown repair. repair: 'D1.L1.CR.1'"));

        Ok(())
    }

    #[test]
    fn sequence_10_grid() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(10);
        let ctx = ctx_guard.1.as_mut().unwrap();

        // and
        let args = prepare_args(vec![ctx.path_arg.as_str(), ctx.project_arg.as_str(), "grid"]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(predicate::str::diff(
                [
                    "     North Sou",
                    " L10 ..... ---",
                    "  L9 ..... ---",
                    "  L8 ..... ---",
                    "  L7 ..... ---",
                    "  L6 ..... ...",
                    "  L5 ..... ...",
                    "  L4 ..... ...",
                    "  L3 ....1 ...",
                    "  L2 ..... ...",
                    "  L1 ..... ...\n",
                ]
                .join("\n"),
            ));

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "grid",
            "--elevation South",
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(predicate::str::starts_with("     Sou\n  L6 ...\n"));

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "grid",
            "--repair-type PR",
            "--format json",
        ]);

        // when
        let output = tracker_cli()
            .args(args)
            .output()?;

        // then
        assert!(output.status.success());
        let view: serde_json::Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(view["max_level"], 10);
        assert_eq!(view["headers"][1]["first_drop"], 6);
        assert_eq!(view["rows"][7][4].as_array().unwrap().len(), 0);
        assert!(view["rows"][0][5].is_null());

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "grid",
            "--elevation East",
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown elevation. name: 'East'"));

        Ok(())
    }

    #[test]
    fn sequence_11_next_code_and_repair_types() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(11);
        let ctx = ctx_guard.1.as_mut().unwrap();

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "code",
            "--drop 5",
            "--level 3",
            "--repair-type CR",
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(predicate::str::diff("D5.L3.CR.2\n"));

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "repair-types",
            "--unit-measure area_thickness",
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(predicate::str::diff("PR Patch render (area_thickness: width, height, thickness)\n"));

        Ok(())
    }

    #[test]
    fn sequence_12_status_skips_unconfigured_repair_types() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(12);
        let ctx = ctx_guard.1.as_mut().unwrap();
        ctx.delete_trace_log();

        // and a repair whose type was never added to the project
        let mut repairs = read_json(&ctx.test_repairs_path);
        let mut unconfigured = repairs[0].clone();
        unconfigured["id"] = "00000000-0000-4000-8000-000000000001".into();
        unconfigured["repair_type"] = "ZZ".into();
        unconfigured["phases"]["survey"]["repair_type"] = "ZZ".into();
        repairs
            .as_array_mut()
            .unwrap()
            .push(unconfigured);
        write(&ctx.test_repairs_path, serde_json::to_string_pretty(&repairs)?)?;

        // and
        let args = prepare_args(vec![
            ctx.trace_log_arg.as_str(),
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "status",
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .success()
            .stderr(print("stderr"))
            .stdout(predicate::str::contains("D5.L3.CR.1 North").and(predicate::str::contains("ZZ").not()));

        // and
        let trace_content: String = read_to_string(ctx.test_trace_log_path.clone())?;
        println!("{}", trace_content);

        assert_contains_inorder!(trace_content, [
            "Skipping repair, repair type is not configured for the project. repair: 'D5.L3.ZZ.1', repair_type: 'ZZ'",
        ]);

        Ok(())
    }

    #[test]
    fn sequence_13_create_existing_project() -> Result<(), anyhow::Error> {
        // given
        let mut ctx_guard = context::acquire(13);
        let ctx = ctx_guard.1.as_mut().unwrap();

        // and
        let args = prepare_args(vec![
            ctx.path_arg.as_str(),
            ctx.project_arg.as_str(),
            "create",
            "--elevation North:1:1",
        ]);

        // when
        tracker_cli()
            .args(args)
            // then
            .assert()
            .failure()
            .stderr(predicate::str::contains("Project already exists."));

        // and
        let project = read_json(&ctx.test_project_path);
        assert_eq!(project["elevations"][0]["drops"], 5);

        // and the context is dropped, as static items are never dropped
        ctx_guard.1.take();

        Ok(())
    }
}
