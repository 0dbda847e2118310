//! Test fixtures for protocol records, cases and endpoint bodies.

use std::fs;
use std::path::{Path, PathBuf};

use fake::{faker::lorem::en::Sentence, Fake};
use serde_json::{json, Value};

use dxeval_domain::EvaluationCase;

/// A protocol record as it appears in a dataset file
pub fn protocol_json(protocol_id: &str, query: &str, gt: &str, icd_codes: &[&str]) -> Value {
    json!({
        "protocol_id": protocol_id,
        "query": query,
        "gt": gt,
        "icd_codes": icd_codes,
    })
}

/// Write `record` to `dir/<file_name>`
pub fn write_case_file(dir: &Path, file_name: &str, record: &Value) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, serde_json::to_vec_pretty(record).expect("serialize record"))
        .expect("write case file");
    path
}

/// Write a well-formed case file named `<protocol_id>.json`
pub fn write_protocol(dir: &Path, protocol_id: &str, query: &str, gt: &str, icd_codes: &[&str]) -> PathBuf {
    write_case_file(
        dir,
        &format!("{}.json", protocol_id),
        &protocol_json(protocol_id, query, gt, icd_codes),
    )
}

/// A validated case with a generated query
pub fn test_case(case_id: &str, gt: &str, valid_codes: &[&str]) -> EvaluationCase {
    test_case_with_query(case_id, &random_symptoms(), gt, valid_codes)
}

/// A validated case with an explicit query
pub fn test_case_with_query(case_id: &str, query: &str, gt: &str, valid_codes: &[&str]) -> EvaluationCase {
    EvaluationCase::new(case_id, query, gt, valid_codes.iter().copied()).expect("valid test case")
}

/// Random free-text symptom description
pub fn random_symptoms() -> String {
    Sentence(4..12).fake()
}

/// Endpoint success body with `codes` ranked 1..N in the given order
pub fn diagnoses_body(codes: &[&str]) -> Value {
    let diagnoses: Vec<Value> = codes
        .iter()
        .enumerate()
        .map(|(i, code)| diagnosis_json(i as u32 + 1, code))
        .collect();

    json!({ "diagnoses": diagnoses })
}

/// One ranked diagnosis entry
pub fn diagnosis_json(rank: u32, code: &str) -> Value {
    json!({
        "rank": rank,
        "icd10_code": code,
        "diagnosis": format!("Simulated diagnosis for {}", code),
        "explanation": "Based on reported symptoms",
    })
}
