//! Tests for model files.

use super::*;
use crate::cosmology::cosmology_consistency;
use crate::error::ConfigError;
use crate::relation::Op;
use crate::tolerance::Tolerance;
use crate::types::{ParamId, Parameters};

const HUBBLE_MODEL: &str = r#"
apiVersion: consistency/v1
kind: ConsistencyModel

metadata:
  name: hubble
  description: "Hubble parameter in two conventions"

tolerance:
  rtol: 1.0e-6

relations:
  - target: h0
    op: div_const
    constant: 100
    inputs: [hubble]
  - target: hubble
    op: scale
    constant: 100
    inputs: [h0]

defaults:
  - name: hubble
    value: 70.0
"#;

#[test]
fn test_model_from_yaml() {
    let model = Model::from_yaml(HUBBLE_MODEL).unwrap();
    assert_eq!(model.metadata.name, "hubble");
    assert_eq!(model.relations.len(), 2);
    assert_eq!(model.relations[0].constant, Some(100.0));
    assert_eq!(model.tolerance, Some(Tolerance::new(1e-6, 1e-8)));
    assert_eq!(model.defaults[0].name, ParamId::from("hubble"));
}

#[test]
fn test_model_builds_engine() {
    let engine = Model::from_yaml(HUBBLE_MODEL).unwrap().build().unwrap();
    assert_eq!(engine.relations()[0].op(), Op::DivConst(100.0));
    assert_eq!(engine.tolerance().rtol, 1e-6);

    let completion = engine.complete(&Parameters::new()).unwrap();
    assert_eq!(completion.assumptions, 1);
    assert_eq!(completion.get("h0"), Some(0.7));
}

#[test]
fn test_shipped_cosmology_model_matches_builtin() {
    let model = Model::from_yaml(include_str!("../../models/cosmology.yaml")).unwrap();
    assert_eq!(model, Model::cosmology());

    let from_file = model.build().unwrap();
    let builtin = cosmology_consistency().unwrap();
    assert_eq!(from_file.relations(), builtin.relations());
    assert_eq!(from_file.defaults(), builtin.defaults());
}

#[test]
fn test_model_yaml_round_trip() {
    let model = Model::cosmology().with_tolerance(Tolerance::new(1e-4, 0.0));
    let yaml = model.to_yaml().unwrap();
    assert!(yaml.contains("apiVersion: consistency/v1"));
    assert!(yaml.contains("kind: ConsistencyModel"));
    assert_eq!(Model::from_yaml(&yaml).unwrap(), model);
}

#[test]
fn test_model_schema_errors() {
    let wrong_version = HUBBLE_MODEL.replace("consistency/v1", "consistency/v0");
    assert!(matches!(
        Model::from_yaml(&wrong_version),
        Err(ModelError::InvalidApiVersion(v)) if v == "consistency/v0"
    ));

    let wrong_kind = HUBBLE_MODEL.replace("kind: ConsistencyModel", "kind: Scenario");
    assert!(matches!(
        Model::from_yaml(&wrong_kind),
        Err(ModelError::InvalidKind(_))
    ));

    let unnamed = HUBBLE_MODEL.replacen("name: hubble", "name: \"\"", 1);
    assert!(matches!(
        Model::from_yaml(&unnamed),
        Err(ModelError::MissingField(field)) if field == "metadata.name"
    ));

    assert!(matches!(
        Model::from_yaml("relations: 3"),
        Err(ModelError::YamlError(_))
    ));
}

#[test]
fn test_model_config_errors_surface_on_build() {
    let unknown_op = HUBBLE_MODEL.replace("op: scale", "op: power");
    let err = Model::from_yaml(&unknown_op).unwrap().build().unwrap_err();
    assert!(matches!(
        err,
        ModelError::Config(ConfigError::UnknownOp { ref name }) if name == "power"
    ));

    let missing_input = HUBBLE_MODEL.replace("inputs: [h0]", "inputs: [h]");
    let err = Model::from_yaml(&missing_input).unwrap().build().unwrap_err();
    assert!(matches!(
        err,
        ModelError::Config(ConfigError::UnknownParameter { .. })
    ));
}

#[test]
fn test_model_load_missing_file() {
    let err = Model::load("/nonexistent/model.yaml").unwrap_err();
    assert!(matches!(err, ModelError::IoError(_)));
}
