use cpf_canoniser::{
    api::yawl_dto::YawlSpecificationDto,
    canonise_file,
    config::CanoniserConfig,
    domain::adapter::{FormatAdapter, Notation, YawlAdapter, canonise},
    domain::cpf::{GatewayKind, NetId, NodeId, NodeKind, ResourceId},
    domain::pattern::{Pattern, find_instances},
    domain::validation::validate,
    error::Error,
    loader::parser::{parse_json_file, parse_json_str},
};

fn data(file: &str) -> String {
    format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), file)
}

#[test]
fn test_deferred_choice_fixture() {
    let canonised = canonise_file(Notation::Yawl, &data("yawl_wpc16_deferred_choice.json"), &CanoniserConfig::default())
        .unwrap();
    let net = &canonised.net;

    assert!(canonised.warnings.is_empty());
    assert!(canonised.is_valid());
    assert_eq!(net.node_count(), 7);
    assert_eq!(net.edge_count(), 7);

    let merge = NodeId::new("out.join");
    assert!(net.node(&merge).unwrap().kind.is_state());
    assert_eq!(net.in_degree(&merge), 2);
    assert_eq!(net.out_degree(&merge), 1);

    let choice = NodeId::new("c");
    assert!(net.node(&choice).unwrap().kind.is_state());
    assert_eq!(net.out_degree(&choice), 2);

    let instances = find_instances(net);
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].pattern, Pattern::DeferredChoice);
    assert_eq!(instances[0].join, Some(merge));
}

#[test]
fn test_order_process_structure() {
    let canonised =
        canonise_file(Notation::Yawl, &data("yawl_order_process.json"), &CanoniserConfig::default()).unwrap();
    let net = &canonised.net;

    assert_eq!(net.node_count(), 13);
    assert_eq!(net.edge_count(), 14);
    assert_eq!(net.node(&NodeId::new("Receive.split")).unwrap().kind, NodeKind::split(GatewayKind::Xor));
    assert_eq!(net.node(&NodeId::new("Ship.join")).unwrap().kind, NodeKind::join(GatewayKind::Xor));
    assert_eq!(net.node(&NodeId::new("Ship.split")).unwrap().kind, NodeKind::split(GatewayKind::And));
    assert_eq!(net.node(&NodeId::new("Archive.join")).unwrap().kind, NodeKind::join(GatewayKind::And));

    let pack = net.node(&NodeId::new("Pack")).unwrap();
    let task = pack.kind.as_task().unwrap();
    assert_eq!(task.subnet, Some(NetId::new("PackNet")));
    assert_eq!(task.multi_instance.as_ref().map(|mi| (mi.min, mi.max)), Some((1, Some(5))));
    assert_eq!(pack.resources, vec![ResourceId::new("warehouse")]);

    let approve = net.node(&NodeId::new("Approve")).unwrap().kind.as_task().unwrap();
    assert_eq!(approve.cancels, vec![NodeId::new("AutoApprove")]);

    let conditions: Vec<_> = net.edges().filter_map(|e| e.condition.as_deref()).collect();
    assert_eq!(conditions, vec!["amount > 1000"]);
    assert_eq!(net.edges().filter(|e| e.default).count(), 1);

    let subnet = net.subnet(&NetId::new("PackNet")).unwrap();
    assert_eq!(subnet.node_count(), 5);
}

#[test]
fn test_round_trip_preserves_structure() {
    let adapter = YawlAdapter::new();
    let config = CanoniserConfig::default();

    for file in ["yawl_wpc16_deferred_choice.json", "yawl_order_process.json"] {
        let document: YawlSpecificationDto = parse_json_file(&data(file)).unwrap();
        let net = canonise(&adapter, &document, &config).unwrap().net;

        let rendered = adapter.render(&net).unwrap();
        assert!(rendered.is_lossless(), "{} lost fidelity: {:?}", file, rendered.warnings);

        let reparsed = adapter.parse(&rendered.output).unwrap().output;
        assert_eq!(reparsed.signature(), net.signature(), "{} changed on round trip", file);
        assert!(validate(&reparsed).is_ok());
    }
}

#[test]
fn test_malformed_specifications() {
    let adapter = YawlAdapter::new();
    let config = CanoniserConfig::default();

    let missing_root = r#"{ "uri": "x", "rootNet": "Nope", "decompositions": [] }"#;
    let document: YawlSpecificationDto = parse_json_str(missing_root).unwrap();
    assert!(matches!(
        canonise(&adapter, &document, &config),
        Err(Error::MalformedDocument { notation: Notation::Yawl, .. })
    ));

    let unknown_role = r#"{
        "uri": "x",
        "rootNet": "N",
        "decompositions": [{
            "id": "N",
            "inputCondition": { "id": "i" },
            "outputCondition": { "id": "o" },
            "tasks": [ { "id": "A", "roles": ["ghost"] } ],
            "flows": [ { "source": "i", "target": "A" }, { "source": "A", "target": "o" } ]
        }]
    }"#;
    let document: YawlSpecificationDto = parse_json_str(unknown_role).unwrap();
    assert!(matches!(canonise(&adapter, &document, &config), Err(Error::MalformedDocument { .. })));
}
