use crate::config::ShareConfig;
use crate::models::ObjectId;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;

/// Characters `encodeURI` escapes; URI delimiters such as `:` `,` `/` stay literal.
const URI: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

#[derive(Debug, Serialize)]
struct Section<'a> {
    position: u32,
    #[serde(rename = "objectIds")]
    object_ids: &'a [ObjectId],
}

/// JSON payload of the `updateSections` parameter: the same ids for every configured position.
pub fn update_sections(config: &ShareConfig, ids: &[ObjectId]) -> serde_json::Result<String> {
    let sections: Vec<Section> = config
        .positions
        .iter()
        .map(|&position| Section {
            position,
            object_ids: ids,
        })
        .collect();
    serde_json::to_string(&sections)
}

/// Link to the instant app pre-filled with the selected trails.
pub fn share_url(config: &ShareConfig, ids: &[ObjectId]) -> serde_json::Result<String> {
    let json = update_sections(config, ids)?;
    Ok(format!(
        "{}?appid={}&updateSections={}",
        config.base_url,
        config.app_id,
        utf8_percent_encode(&json, URI)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_sections_json() {
        let json = update_sections(&ShareConfig::default(), &[3, 7]).unwrap();
        assert_eq!(
            json,
            r#"[{"position":1,"objectIds":[3,7]},{"position":2,"objectIds":[3,7]}]"#
        );
    }

    #[test]
    fn test_share_url_matches_encode_uri() {
        let url = share_url(&ShareConfig::default(), &[3, 7]).unwrap();
        assert_eq!(
            url,
            "https://jsapi.maps.arcgis.com/apps/instant/countdown/index.html\
             ?appid=5bede2bb8c344f0baa464b6e142bc5b0\
             &updateSections=%5B%7B%22position%22:1,%22objectIds%22:%5B3,7%5D%7D,\
             %7B%22position%22:2,%22objectIds%22:%5B3,7%5D%7D%5D"
        );
    }

    #[test]
    fn test_empty_selection_still_encodes() {
        let config = ShareConfig {
            positions: vec![4],
            ..ShareConfig::default()
        };
        let url = share_url(&config, &[]).unwrap();
        assert!(url.ends_with("updateSections=%5B%7B%22position%22:4,%22objectIds%22:%5B%5D%7D%5D"));
    }
}
