//! Disease enrichment against a mock metadata service

use mabkg_ingest::config::{EnrichmentConfig, IngestConfig, RelationFamily};
use mabkg_ingest::enrich::{
    enrich_documents, DiseaseLookup, DiseaseNameCache, EnrichError, HttpDiseaseLookup,
};
use mabkg_ingest::pipeline::Pipeline;
use mabkg_ingest::reader::TableReader;
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn enrichment_config(server: &MockServer) -> EnrichmentConfig {
    EnrichmentConfig {
        enabled: true,
        base_url: format!("{}/v1/query", server.uri()),
        timeout_secs: 5,
        ..EnrichmentConfig::default()
    }
}

fn hit(name: &str) -> Value {
    json!({
        "total": 1,
        "hits": [{"_id": "MONDO:0005502", "disease_ontology": {"name": name}}],
    })
}

fn disease_doc(id: &str) -> Value {
    json!({"_id": format!("11060-{}", id), "object": {"id": id, "type": "Disease"}})
}

#[tokio::test]
async fn test_lookup_reads_name_at_pointer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/query"))
        .and(query_param("q", "Dengue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hit("dengue disease")))
        .mount(&server)
        .await;

    let lookup = HttpDiseaseLookup::new(&enrichment_config(&server)).unwrap();
    let name = lookup.lookup("Dengue").await.unwrap();

    assert_eq!(name.as_deref(), Some("dengue disease"));
}

#[tokio::test]
async fn test_lookup_without_hits_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "hits": []})))
        .mount(&server)
        .await;

    let lookup = HttpDiseaseLookup::new(&enrichment_config(&server)).unwrap();
    assert_eq!(lookup.lookup("Unknown").await.unwrap(), None);
}

#[tokio::test]
async fn test_custom_name_pointer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/query"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": {"label": "COVID-19"}})),
        )
        .mount(&server)
        .await;

    let config = EnrichmentConfig {
        name_pointer: "/result/label".to_string(),
        ..enrichment_config(&server)
    };
    let lookup = HttpDiseaseLookup::new(&config).unwrap();

    assert_eq!(lookup.lookup("D000086382").await.unwrap().as_deref(), Some("COVID-19"));
}

#[tokio::test]
async fn test_non_success_status_is_cached_as_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/query"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let lookup = HttpDiseaseLookup::new(&enrichment_config(&server)).unwrap();
    let err = lookup.lookup("D12345").await.unwrap_err();
    assert!(matches!(err, EnrichError::Status(503)));

    // A status code is an answer, so it is cached even when retrying
    let mut cache = DiseaseNameCache::new();
    let mut docs = vec![disease_doc("D12345"), disease_doc("D12345")];

    let stats = enrich_documents(&mut docs, &lookup, &mut cache, true).await;

    assert_eq!(stats.lookups, 1);
    assert_eq!(stats.failures, 1);
    assert_eq!(stats.resolved, 0);
    assert!(cache.contains("D12345"));
    assert!(docs.iter().all(|doc| doc["object"].get("name").is_none()));
}

#[tokio::test]
async fn test_repeated_label_hits_service_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/query"))
        .and(query_param("q", "D003715"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hit("dengue disease")))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = HttpDiseaseLookup::new(&enrichment_config(&server)).unwrap();
    let mut cache = DiseaseNameCache::new();
    let mut docs = vec![disease_doc("D003715"), disease_doc("D003715"), disease_doc("D003715")];

    let stats = enrich_documents(&mut docs, &lookup, &mut cache, false).await;

    assert_eq!(stats.lookups, 1);
    assert_eq!(stats.resolved, 3);
    assert_eq!(cache.len(), 1);
    assert!(docs.iter().all(|doc| doc["object"]["name"] == "dengue disease"));
}

#[tokio::test]
async fn test_transport_failure_retry_policy() {
    // Nothing listens here
    let config = EnrichmentConfig {
        enabled: true,
        base_url: "http://127.0.0.1:9/v1/query".to_string(),
        timeout_secs: 2,
        ..EnrichmentConfig::default()
    };
    let lookup = HttpDiseaseLookup::new(&config).unwrap();

    let mut cache = DiseaseNameCache::new();
    let mut docs = vec![disease_doc("D12345"), disease_doc("D12345")];
    let stats = enrich_documents(&mut docs, &lookup, &mut cache, false).await;
    assert_eq!(stats.lookups, 1);
    assert_eq!(stats.failures, 1);
    assert!(cache.contains("D12345"));

    let mut cache = DiseaseNameCache::new();
    let stats = enrich_documents(&mut docs, &lookup, &mut cache, true).await;
    assert_eq!(stats.lookups, 2);
    assert_eq!(stats.failures, 2);
    assert!(!cache.contains("D12345"));
}

#[tokio::test]
async fn test_pipeline_enrichment_uses_disease_name_as_label() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/query"))
        .and(query_param("q", "Dengue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hit("dengue disease")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/query"))
        .and(query_param("q", "D000086382"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let table = "mab_uid\tmab_name\tvirus_id\tvirus_name\tdisease_id\tdisease_name\n\
                 MAB1\t2D22\t11060\tDengue virus 2\tD003715\tDengue\n\
                 MAB2\t1C19\t11060\tDengue virus 2\tD003715\tDengue\n\
                 MAB3\tCR3022\t2697049\tSARS-CoV-2\tD000086382\t\n";

    let mut config = IngestConfig::default();
    config.families = vec![RelationFamily::VirusDisease, RelationFamily::AntibodyDisease];
    config.enrichment = enrichment_config(&server);

    let pipeline = Pipeline::new(config).unwrap();
    let reader = TableReader::from_reader(table.as_bytes(), b'\t').unwrap();
    let mut output = pipeline.run_reader(reader).unwrap();

    let lookup = HttpDiseaseLookup::new(&pipeline.config().enrichment).unwrap();
    let stats = pipeline.enrich(&mut output, &lookup).await;

    assert_eq!(stats.candidates, 6);
    assert_eq!(stats.lookups, 2);
    assert_eq!(stats.resolved, 4);

    let names: Vec<Option<&str>> = output
        .documents
        .iter()
        .map(|doc| doc["object"].get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(
        names,
        vec![
            Some("dengue disease"),
            Some("dengue disease"),
            Some("dengue disease"),
            Some("dengue disease"),
            None,
            None,
        ]
    );
}
