mod common;

use common::Lab;

#[test]
fn clean_names_pass() {
    let lab = Lab::new();
    lab.add_coc("austin", "123456coc.pdf");
    lab.add_coc("corpus", "QC123-456coc.pdf");
    lab.add_page("123456pg1.pdf");
    lab.add_page("job_12 QC123-456pg1.pdf");

    let out = lab.collator_ok(&["check"]);
    assert!(out.contains("Checked 2 CoC name(s) and 2 page name(s)."), "{out}");
    assert!(out.contains("All CoC names pass."), "{out}");
    assert!(!out.contains("ignored"), "{out}");
}

#[test]
fn misnamed_pages_are_listed_but_do_not_fail() {
    let lab = Lab::new();
    lab.add_coc("austin", "123456coc.pdf");
    lab.add_page("123456pg1.pdf");
    lab.add_page("123456 page1.pdf");
    lab.add_page("jobscan.pdf");

    let out = lab.collator_ok(&["check"]);
    assert!(out.contains("Page names that will be ignored:"), "{out}");
    assert!(out.contains("123456 page1.pdf"), "{out}");
    assert!(out.contains("jobscan.pdf"), "{out}");
}

#[test]
fn malformed_cocs_fail_with_reasons() {
    let lab = Lab::new();
    lab.add_coc("austin", "123456-456coc.pdf");
    lab.add_coc("corpus", "123996-995coc.pdf");
    lab.add_coc("corpus", "123456a-457coc.pdf");

    let out = lab.collator_in(&["check", "--format", "json"]);
    assert!(!out.status.success());

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let malformed = report["malformed_cocs"].as_array().unwrap();
    let reasons: Vec<(&str, &str)> = malformed
        .iter()
        .map(|m| {
            (
                m["name"].as_str().unwrap(),
                m["reason"]["kind"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        reasons,
        [
            ("123456-456coc.pdf", "degenerate-range"),
            ("123456a-457coc.pdf", "rerun-mismatch"),
            ("123996-995coc.pdf", "descending-range"),
        ]
    );
}

#[test]
fn text_failure_includes_cheat_sheet() {
    let lab = Lab::new();
    lab.add_coc("austin", "QC123456coc.pdf");

    let out = lab.collator_in(&["check"]);
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1 CoC file(s) are improperly named"), "{stdout}");
    assert!(stdout.contains("QC/WP/SP:    QC123-456coc.pdf"), "{stdout}");
}
