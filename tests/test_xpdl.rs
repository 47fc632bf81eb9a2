use cpf_canoniser::{
    api::xpdl_dto::XpdlPackageDto,
    canonise_file,
    config::CanoniserConfig,
    domain::adapter::{FormatAdapter, Notation, XpdlAdapter, canonise},
    domain::cpf::{GatewayKind, NetId, NodeId, NodeKind, ResourceId},
    domain::validation::ViolationKind,
    error::Error,
    loader::parser::{parse_json_file, parse_json_str},
};

fn data(file: &str) -> String {
    format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), file)
}

#[test]
fn test_claims_package_structure() {
    let canonised =
        canonise_file(Notation::Xpdl, &data("xpdl_claims_package.json"), &CanoniserConfig::default()).unwrap();
    let net = &canonised.net;

    assert!(canonised.warnings.is_empty());
    assert_eq!(net.id, NetId::new("Claims"));
    assert_eq!(net.node_count(), 8);
    assert_eq!(net.edge_count(), 8);
    assert_eq!(net.node(&NodeId::new("g1")).unwrap().kind, NodeKind::split(GatewayKind::Xor));
    assert_eq!(net.node(&NodeId::new("g2")).unwrap().kind, NodeKind::join(GatewayKind::Xor));

    let assess = net.node(&NodeId::new("Assess")).unwrap();
    let task = assess.kind.as_task().unwrap();
    assert_eq!(task.subnet, Some(NetId::new("AssessClaim")));
    assert_eq!(task.multi_instance.as_ref().map(|mi| mi.max), Some(Some(3)));
    assert_eq!(assess.resources, vec![ResourceId::new("assessor")]);

    let subnet = net.subnet(&NetId::new("AssessClaim")).unwrap();
    assert_eq!(subnet.node(&NodeId::new("g3")).unwrap().kind, NodeKind::split(GatewayKind::And));
}

#[test]
fn test_round_trip_preserves_structure() {
    let adapter = XpdlAdapter::new();
    let document: XpdlPackageDto = parse_json_file(&data("xpdl_claims_package.json")).unwrap();
    let net = adapter.parse(&document).unwrap().output;

    let rendered = adapter.render(&net).unwrap();
    assert!(rendered.is_lossless());
    assert_eq!(rendered.output.workflow_processes.len(), 2);
    assert_eq!(rendered.output.participants.len(), 2);

    let reparsed = adapter.parse(&rendered.output).unwrap().output;
    assert_eq!(reparsed.signature(), net.signature());
}

#[test]
fn test_recursive_sub_flow_is_malformed() {
    let json = r#"{
        "id": "p",
        "workflowProcesses": [
            {
                "id": "A",
                "activities": [ { "id": "call", "type": "subFlow", "process": "B" } ]
            },
            {
                "id": "B",
                "activities": [ { "id": "back", "type": "subFlow", "process": "A" } ]
            }
        ]
    }"#;
    let document: XpdlPackageDto = parse_json_str(json).unwrap();
    assert!(matches!(
        XpdlAdapter::new().parse(&document),
        Err(Error::MalformedDocument { notation: Notation::Xpdl, .. })
    ));
}

#[test]
fn test_orphan_activity_is_reported_or_rejected() {
    let json = r#"{
        "id": "p",
        "workflowProcesses": [{
            "id": "main",
            "activities": [
                { "id": "s", "type": "startEvent" },
                { "id": "A", "type": "task" },
                { "id": "forgotten", "type": "task" },
                { "id": "e", "type": "endEvent" }
            ],
            "transitions": [
                { "id": "t1", "from": "s", "to": "A" },
                { "id": "t2", "from": "A", "to": "e" }
            ]
        }]
    }"#;
    let document: XpdlPackageDto = parse_json_str(json).unwrap();
    let adapter = XpdlAdapter::new();

    let lenient = canonise(&adapter, &document, &CanoniserConfig::lenient()).unwrap();
    assert_eq!(lenient.violations.len(), 1);
    assert_eq!(lenient.violations[0].kind, ViolationKind::OrphanNode { node: NodeId::new("forgotten") });
    assert!(matches!(lenient.into_valid(), Err(Error::StructuralViolations(_))));

    assert!(matches!(
        canonise(&adapter, &document, &CanoniserConfig::default()),
        Err(Error::StructuralViolations(violations)) if violations.len() == 1
    ));
}
