//! Manifest validation.
//!
//! Checks run in a fixed order and stop at the first failure: required
//! top-level fields, game code format, pack type, the engine game code rule,
//! a non-empty asset table, then each asset in document order.

use serde_json::{Map, Value};

use crate::config::{PipelineConfig, ENGINE_GAME_CODE};
use crate::error::{PackError, Result};

use super::{AssetEntry, AssetType, Manifest, PackType};

/// Longest allowed asset name, in characters.
pub const MAX_ASSET_NAME_LEN: usize = 32;

/// Longest allowed game code, in characters.
pub const MAX_GAME_CODE_LEN: usize = 4;

/// Inputs the validator needs beyond the document itself.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRules<'a> {
    /// Asset types a manifest may reference.
    pub asset_types: &'a [AssetType],
    /// Game code required for `engine` packs.
    pub engine_game_code: &'a str,
}

impl Default for ValidationRules<'static> {
    fn default() -> Self {
        Self {
            asset_types: &AssetType::ALL,
            engine_game_code: ENGINE_GAME_CODE,
        }
    }
}

impl<'a> ValidationRules<'a> {
    pub fn from_config(config: &'a PipelineConfig) -> Self {
        Self {
            asset_types: config.asset_types(),
            engine_game_code: config.engine_game_code(),
        }
    }
}

/// Where a field lives, for error messages.
#[derive(Clone, Copy)]
enum Scope<'a> {
    Base,
    Asset(&'a str),
}

/// Decode a parsed JSON document into a [`Manifest`].
pub fn validate(document: &Value, rules: &ValidationRules<'_>) -> Result<Manifest> {
    let root = document.as_object().ok_or_else(|| PackError::Schema {
        message: format!("Manifest must be a JSON object, found {}", json_kind(document)),
        help: Some("See --create-json-example for the expected layout".to_string()),
    })?;

    let pack_type = require(root, "packType", Scope::Base, "a string", Value::as_str)?;
    let game_code = require(root, "gameCode", Scope::Base, "a string", Value::as_str)?;
    let assets = require(root, "assets", Scope::Base, "an object", Value::as_object)?;

    check_game_code(game_code)?;

    let pack_type = PackType::from_name(pack_type).ok_or_else(|| PackError::Semantic {
        message: format!("'packType' value '{}' is not a known pack type", pack_type),
        help: Some(format!("Use one of: {}", pack_type_names())),
    })?;

    if pack_type == PackType::Engine && game_code != rules.engine_game_code {
        return Err(PackError::Semantic {
            message: format!(
                "'engine' packs must use game code '{}', found '{}'",
                rules.engine_game_code, game_code
            ),
            help: Some("Use packType 'game', 'mod' or 'expac' for non-engine content".to_string()),
        });
    }

    if assets.is_empty() {
        return Err(PackError::semantic("No assets were found in 'assets'"));
    }

    let assets = assets
        .iter()
        .map(|(name, value)| validate_asset(name, value, rules))
        .collect::<Result<Vec<_>>>()?;

    Ok(Manifest {
        pack_type,
        game_code: game_code.to_string(),
        assets,
    })
}

fn check_game_code(game_code: &str) -> Result<()> {
    if game_code.is_empty() {
        return Err(PackError::semantic("'gameCode' must not be empty"));
    }
    if let Some(bad) = game_code.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(PackError::Semantic {
            message: format!(
                "'gameCode' value '{}' contains '{}', only letters and digits are allowed",
                game_code, bad
            ),
            help: None,
        });
    }
    if game_code.chars().count() > MAX_GAME_CODE_LEN {
        return Err(PackError::semantic(format!(
            "'gameCode' value '{}' is too long, game codes must be a maximum of {} characters",
            game_code, MAX_GAME_CODE_LEN
        )));
    }
    Ok(())
}

fn validate_asset(name: &str, value: &Value, rules: &ValidationRules<'_>) -> Result<AssetEntry> {
    if name.is_empty() {
        return Err(PackError::semantic("Asset names must not be empty"));
    }
    if name.chars().count() > MAX_ASSET_NAME_LEN {
        return Err(PackError::semantic(format!(
            "Asset name '{}' is too long, asset names must be a maximum of {} characters",
            name, MAX_ASSET_NAME_LEN
        )));
    }

    let fields = value.as_object().ok_or_else(|| {
        PackError::schema(format!(
            "Asset '{}' must be an object, found {}",
            name,
            json_kind(value)
        ))
    })?;
    let scope = Scope::Asset(name);

    let type_name = require(fields, "type", scope, "a string", Value::as_str)?;
    let asset_type = AssetType::from_name(type_name)
        .filter(|t| rules.asset_types.contains(t))
        .ok_or_else(|| PackError::Semantic {
            message: format!("Asset '{}' has invalid type '{}'", name, type_name),
            help: Some(format!(
                "Use one of: {}",
                rules
                    .asset_types
                    .iter()
                    .map(|t| t.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        })?;

    let filename = require(fields, "filename", scope, "a string", Value::as_str)?;
    if filename.is_empty() {
        return Err(PackError::semantic(format!(
            "'filename' in asset '{}' must not be empty",
            name
        )));
    }

    let tags = require(fields, "tags", scope, "an array", Value::as_array)?;
    let tags = tags
        .iter()
        .enumerate()
        .map(|(index, tag)| {
            tag.as_str().map(str::to_string).ok_or_else(|| {
                PackError::schema(format!(
                    "'tags' in asset '{}' must contain only strings, found {} at index {}",
                    name,
                    json_kind(tag),
                    index
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AssetEntry {
        name: name.to_string(),
        asset_type,
        filename: filename.to_string(),
        tags,
    })
}

/// Fetch a field and project it to the expected JSON shape.
///
/// Absent fields and wrongly shaped fields produce different messages.
fn require<'v, T>(
    object: &'v Map<String, Value>,
    field: &str,
    scope: Scope<'_>,
    expected: &str,
    project: impl Fn(&'v Value) -> Option<T>,
) -> Result<T> {
    let value = object.get(field).ok_or_else(|| {
        PackError::schema(match scope {
            Scope::Base => format!("Could not find required field '{}'", field),
            Scope::Asset(asset) => {
                format!("Could not find field '{}' for asset '{}'", field, asset)
            }
        })
    })?;

    project(value).ok_or_else(|| {
        PackError::schema(match scope {
            Scope::Base => format!(
                "'{}' must be {}, found {}",
                field,
                expected,
                json_kind(value)
            ),
            Scope::Asset(asset) => format!(
                "'{}' in asset '{}' must be {}, found {}",
                field,
                asset,
                expected,
                json_kind(value)
            ),
        })
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn pack_type_names() -> String {
    PackType::ALL
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rules() -> ValidationRules<'static> {
        ValidationRules::default()
    }

    fn valid() -> Value {
        json!({
            "packType": "game",
            "gameCode": "TEST",
            "assets": {
                "hero": { "type": "image", "filename": "hero.png", "tags": ["player", "sprite"] }
            }
        })
    }

    fn message(err: PackError) -> String {
        err.to_string()
    }

    #[test]
    fn test_valid_manifest() {
        let manifest = validate(&valid(), &rules()).unwrap();

        assert_eq!(manifest.pack_type, PackType::Game);
        assert_eq!(manifest.game_code, "TEST");
        assert_eq!(
            manifest.assets,
            vec![AssetEntry {
                name: "hero".to_string(),
                asset_type: AssetType::Image,
                filename: "hero.png".to_string(),
                tags: vec!["player".to_string(), "sprite".to_string()],
            }]
        );
    }

    #[test]
    fn test_missing_top_level_fields_are_schema_errors() {
        for field in ["packType", "gameCode", "assets"] {
            let mut doc = valid();
            doc.as_object_mut().unwrap().remove(field);

            let err = validate(&doc, &rules()).unwrap_err();
            assert!(matches!(err, PackError::Schema { .. }), "{field}: {err:?}");
            assert!(message(err).contains(&format!("Could not find required field '{}'", field)));
        }
    }

    #[test]
    fn test_wrong_shape_differs_from_absent() {
        let mut doc = valid();
        doc["gameCode"] = json!(1234);

        let err = validate(&doc, &rules()).unwrap_err();
        assert_eq!(message(err), "Schema error: 'gameCode' must be a string, found a number");

        let mut doc = valid();
        doc["assets"] = json!([]);
        let err = validate(&doc, &rules()).unwrap_err();
        assert_eq!(message(err), "Schema error: 'assets' must be an object, found an array");
    }

    #[test]
    fn test_non_object_root() {
        let err = validate(&json!([1, 2]), &rules()).unwrap_err();
        assert!(matches!(err, PackError::Schema { .. }));
    }

    #[test]
    fn test_schema_checked_before_game_code() {
        // Bad game code and missing assets: the missing field is reported first.
        let doc = json!({ "packType": "game", "gameCode": "TOO-LONG" });
        let err = validate(&doc, &rules()).unwrap_err();
        assert!(message(err).contains("'assets'"));
    }

    #[test]
    fn test_game_code_rules() {
        for bad in ["TES!", "AB C", "ABCDE", "", "ÄBC"] {
            let mut doc = valid();
            doc["gameCode"] = json!(bad);
            let err = validate(&doc, &rules()).unwrap_err();
            assert!(matches!(err, PackError::Semantic { .. }), "{bad}: {err:?}");
        }

        for good in ["A", "ab12", "TEST", "0000"] {
            let mut doc = valid();
            doc["gameCode"] = json!(good);
            assert!(validate(&doc, &rules()).is_ok(), "{good}");
        }
    }

    #[test]
    fn test_unknown_pack_type() {
        let mut doc = valid();
        doc["packType"] = json!("dlc");

        let err = validate(&doc, &rules()).unwrap_err();
        assert!(matches!(err, PackError::Semantic { .. }));
        assert!(message(err).contains("'dlc'"));
    }

    #[test]
    fn test_pack_types_are_case_sensitive() {
        let mut doc = valid();
        doc["packType"] = json!("Game");
        assert!(validate(&doc, &rules()).is_err());
    }

    #[test]
    fn test_engine_pack_requires_engine_code() {
        let mut doc = valid();
        doc["packType"] = json!("engine");
        let err = validate(&doc, &rules()).unwrap_err();
        assert!(matches!(err, PackError::Semantic { .. }));

        doc["gameCode"] = json!("LOAM");
        let manifest = validate(&doc, &rules()).unwrap();
        assert_eq!(manifest.pack_type, PackType::Engine);
    }

    #[test]
    fn test_engine_code_comes_from_rules() {
        let mut doc = valid();
        doc["packType"] = json!("engine");
        doc["gameCode"] = json!("CORE");
        let custom = ValidationRules {
            asset_types: &AssetType::ALL,
            engine_game_code: "CORE",
        };
        assert!(validate(&doc, &custom).is_ok());
    }

    #[test]
    fn test_empty_assets() {
        let mut doc = valid();
        doc["assets"] = json!({});
        let err = validate(&doc, &rules()).unwrap_err();
        assert_eq!(message(err), "Invalid manifest: No assets were found in 'assets'");
    }

    #[test]
    fn test_asset_name_length() {
        let exactly = "a".repeat(MAX_ASSET_NAME_LEN);
        let too_long = "a".repeat(MAX_ASSET_NAME_LEN + 1);
        let entry = json!({ "type": "image", "filename": "x.png", "tags": [] });

        let single = |name: &str| {
            let mut assets = Map::new();
            assets.insert(name.to_string(), entry.clone());
            Value::Object(assets)
        };

        let mut doc = valid();
        doc["assets"] = single(&exactly);
        assert!(validate(&doc, &rules()).is_ok());

        doc["assets"] = single(&too_long);
        let err = validate(&doc, &rules()).unwrap_err();
        assert!(matches!(err, PackError::Semantic { .. }));
        assert!(message(err).contains(&too_long));
    }

    #[test]
    fn test_asset_must_be_object() {
        let mut doc = valid();
        doc["assets"] = json!({ "hero": "hero.png" });
        let err = validate(&doc, &rules()).unwrap_err();
        assert_eq!(message(err), "Schema error: Asset 'hero' must be an object, found a string");
    }

    #[test]
    fn test_asset_fields_name_the_asset() {
        let mut doc = valid();
        doc["assets"]["hero"].as_object_mut().unwrap().remove("filename");
        let err = validate(&doc, &rules()).unwrap_err();
        assert_eq!(
            message(err),
            "Schema error: Could not find field 'filename' for asset 'hero'"
        );

        let mut doc = valid();
        doc["assets"]["hero"]["tags"] = json!("player");
        let err = validate(&doc, &rules()).unwrap_err();
        assert_eq!(
            message(err),
            "Schema error: 'tags' in asset 'hero' must be an array, found a string"
        );
    }

    #[test]
    fn test_tags_must_be_strings() {
        let mut doc = valid();
        doc["assets"]["hero"]["tags"] = json!(["ok", 7]);
        let err = validate(&doc, &rules()).unwrap_err();
        assert!(matches!(err, PackError::Schema { .. }));
        assert!(message(err).contains("index 1"));
    }

    #[test]
    fn test_asset_type_must_be_allowed() {
        let mut doc = valid();
        doc["assets"]["hero"]["type"] = json!("mesh");
        let err = validate(&doc, &rules()).unwrap_err();
        assert!(matches!(err, PackError::Semantic { .. }));

        let images_only = ValidationRules {
            asset_types: &[AssetType::Image],
            engine_game_code: ENGINE_GAME_CODE,
        };
        let mut doc = valid();
        doc["assets"]["hero"]["type"] = json!("audio");
        assert!(validate(&doc, &images_only).is_err());
    }

    #[test]
    fn test_type_checked_before_filename() {
        let mut doc = valid();
        doc["assets"]["hero"] = json!({ "type": "mesh" });
        let err = validate(&doc, &rules()).unwrap_err();
        assert!(message(err).contains("invalid type 'mesh'"));
    }

    #[test]
    fn test_stops_at_first_bad_asset() {
        let doc = json!({
            "packType": "mod",
            "gameCode": "TEST",
            "assets": {
                "first": { "type": "image", "filename": "a.png" },
                "second": { "filename": "b.png", "tags": [] }
            }
        });
        let err = validate(&doc, &rules()).unwrap_err();
        assert!(message(err).contains("asset 'first'"));
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let mut doc = valid();
        doc["comment"] = json!("hello");
        doc["assets"]["hero"]["notes"] = json!(42);
        assert!(validate(&doc, &rules()).is_ok());
    }
}
