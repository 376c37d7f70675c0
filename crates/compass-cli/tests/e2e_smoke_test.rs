use std::{fs, path::PathBuf};

use log::LevelFilter;
use tempfile::tempdir;

use compass_cli::{Args, run};

/// Demo sessions live at the workspace root, not inside the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .toml files from a directory
fn collect_session_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(input: &PathBuf, output: &PathBuf, config: Option<String>) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config,
        exercise_id: 1,
        log_level: LevelFilter::Off,
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let valid_demos = collect_session_files(demos_path());

    assert!(!valid_demos.is_empty(), "No demo sessions found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_filename = format!(
            "{}.report.toml",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        match run(&args(demo_path, &output_path, None)) {
            Ok(()) => {
                let report = fs::read_to_string(&output_path).expect("Report was not written");
                if toml::from_str::<toml::Table>(&report).is_err() {
                    failed_demos.push((demo_path.clone(), "report is not valid TOML".to_string()));
                }
            }
            Err(e) => failed_demos.push((demo_path.clone(), e.to_string())),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nDemo sessions that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo session(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} demo sessions passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_session_files(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_filename = format!(
            "error_{}.report.toml",
            demo_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        if run(&args(demo_path, &output_path, None)).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error demos failed as expected",
        error_demos.len()
    );
}

#[test]
fn e2e_report_contents() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("pizza_class_diagrams.toml");
    let output = temp_dir.path().join("report.toml");

    run(&args(&input, &output, None)).expect("Demo session failed");

    let report = fs::read_to_string(&output).expect("Report was not written");
    let report: toml::Table = toml::from_str(&report).expect("Report is not valid TOML");

    let diagrams = report["diagrams"].as_array().unwrap();
    assert_eq!(diagrams.len(), 4);

    let graded = &diagrams[0];
    assert_eq!(graded["submission_id"].as_integer(), Some(1));
    assert_eq!(graded["manually_assessed"].as_bool(), Some(true));

    // Submission 2 shares its pizza class, the size attribute and the order
    // class with the graded one.
    let similar = &diagrams[1];
    assert_eq!(similar["manually_assessed"].as_bool(), Some(false));
    assert!(similar["entities_covered"].as_integer().unwrap() >= 3);

    let statistics = report["statistics"].as_table().unwrap();
    assert_eq!(statistics["models"].as_integer(), Some(4));
    assert_eq!(statistics["assessed_submissions"].as_integer(), Some(1));

    let next_models = report["next_models"].as_array().unwrap();
    assert!(!next_models.iter().any(|id| id.as_integer() == Some(1)));
    assert!(report["failures"].as_array().unwrap().is_empty());
}

#[test]
fn e2e_broken_submission_is_listed() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("partially_broken_submissions.toml");
    let output = temp_dir.path().join("report.toml");

    run(&args(&input, &output, None)).expect("Demo session failed");

    let report = fs::read_to_string(&output).expect("Report was not written");
    let report: toml::Table = toml::from_str(&report).expect("Report is not valid TOML");
    let failures = report["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["submission_id"].as_integer(), Some(21));
    assert_eq!(failures[0]["stage"].as_str(), Some("load"));
    assert_eq!(report["diagrams"].as_array().unwrap().len(), 1);
}

#[test]
fn e2e_invalid_config_is_fatal() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[compass]\nequality_threshold = 1.5\n").unwrap();

    let input = demos_path().join("checkout_activity_diagrams.toml");
    let output = temp_dir.path().join("report.toml");

    let result = run(&args(
        &input,
        &output,
        Some(config_path.to_string_lossy().to_string()),
    ));

    assert!(result.is_err());
    assert!(!output.exists());
}
