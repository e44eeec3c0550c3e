mod common;

use common::Lab;

fn range_lab() -> Lab {
    let lab = Lab::new();
    lab.add_coc("austin", "123456coc.pdf");
    lab.add_coc("corpus", "123450-452coc.pdf");
    for page in [
        "123456pg1.pdf",
        "123456pg2.pdf",
        "123450pg1.pdf",
        "123452pg1.pdf",
        "job_3 999999pg1.pdf",
    ] {
        lab.add_page(page);
    }
    lab
}

#[test]
fn plan_json_lists_bundles_in_emission_order() {
    let lab = range_lab();
    let plan = lab.collator_json(&["plan", "--format", "json"]);

    let bundles = plan["bundles"].as_array().expect("bundles array");
    assert_eq!(bundles.len(), 2);

    assert_eq!(bundles[0]["report"], "123450-452.pdf");
    assert_eq!(bundles[0]["collection"], "corpus");
    assert_eq!(
        bundles[0]["pdfs"],
        serde_json::json!(["123450pg1.pdf", "123452pg1.pdf"])
    );
    assert_eq!(bundles[0]["missing_pdfs"], serde_json::json!(["123451"]));

    assert_eq!(bundles[1]["report"], "123456.pdf");
    assert_eq!(
        bundles[1]["pdfs"],
        serde_json::json!(["123456pg1.pdf", "123456pg2.pdf"])
    );
    assert!(bundles[1].get("missing_pdfs").is_none());

    assert_eq!(plan["unresolved"][0]["page"], "999999pg1.pdf");
    assert_eq!(plan["unresolved"][0]["reason"], "no-coc");
    assert_eq!(plan["renamed"][0]["to"], "999999pg1.pdf");
}

#[test]
fn plan_changes_nothing_on_disk() {
    let lab = range_lab();
    lab.collator_ok(&["plan"]);

    assert!(lab.exists("reviewed/job_3 999999pg1.pdf"));
    assert!(!lab.exists("reviewed/999999pg1.pdf"));
    assert!(lab.exists("cocs/austin/123456coc.pdf"));
    assert!(!lab.exists("finished/123456.pdf"));
}

#[test]
fn plan_text_shows_missing_and_unmatched() {
    let lab = range_lab();
    let out = lab.collator_ok(&["plan"]);

    assert!(out.contains("rename: job_3 999999pg1.pdf -> 999999pg1.pdf"), "{out}");
    assert!(out.contains("2 report(s), 1 incomplete:"), "{out}");
    assert!(out.contains("missing: 123451"), "{out}");
    assert!(out.contains("999999pg1.pdf: no CoC found"), "{out}");
}

#[test]
fn plan_reports_overlapping_ranges() {
    let lab = Lab::new();
    lab.add_coc("austin", "123450-455coc.pdf");
    lab.add_coc("corpus", "123453-458coc.pdf");
    lab.add_page("123454pg1.pdf");

    let plan = lab.collator_json(&["plan", "--format", "json"]);
    let overlaps = plan["overlaps"].as_array().expect("overlaps array");
    assert_eq!(overlaps.len(), 3);
    assert_eq!(overlaps[0]["sample"], "123453");
    assert_eq!(
        overlaps[0]["claimants"],
        serde_json::json!(["123450-455coc.pdf", "123453-458coc.pdf"])
    );
}

#[test]
fn malformed_coc_blocks_the_plan() {
    let lab = Lab::new();
    lab.add_coc("austin", "123456coc.pdf");
    lab.add_coc("corpus", "123456-456coc.pdf");
    lab.add_page("123456pg1.pdf");

    let stderr = lab.collator_fails(&["plan"]);
    assert!(stderr.contains("123456-456coc.pdf"), "{stderr}");
    assert!(stderr.contains("Range-rerun: 123456a-457acoc.pdf"), "{stderr}");
}

#[test]
fn missing_config_is_reported() {
    let lab = Lab::new();
    std::fs::remove_file(lab.path("collator.toml")).unwrap();

    let stderr = lab.collator_fails(&["plan"]);
    assert!(stderr.contains("collator.toml"), "{stderr}");
    assert!(stderr.contains("To fix:"), "{stderr}");
}

#[test]
fn plan_reports_prefix_collisions_like_collate() {
    let lab = Lab::new();
    lab.add_coc("austin", "123456coc.pdf");
    lab.add_page("123456pg1.pdf");
    lab.add_page("job_7 123456pg1.pdf");

    let plan = lab.collator_json(&["plan", "--format", "json"]);
    assert_eq!(plan["renamed"], serde_json::json!([]));
    assert_eq!(plan["invalid_pages"][0]["name"], "job_7 123456pg1.pdf");
    assert_eq!(plan["bundles"][0]["pdfs"], serde_json::json!(["123456pg1.pdf"]));
}

#[cfg(unix)]
#[test]
fn symlinked_malformed_coc_blocks_the_plan() {
    let lab = Lab::new();
    lab.add_coc("austin", "123456coc.pdf");
    lab.add_page("123456pg1.pdf");
    std::os::unix::fs::symlink(
        lab.path("cocs/austin/123456coc.pdf"),
        lab.path("cocs/corpus/bad-name.pdf"),
    )
    .unwrap();

    let stderr = lab.collator_fails(&["plan"]);
    assert!(stderr.contains("bad-name.pdf"), "{stderr}");
}
