/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Vocabulary shared by SPEKE v2 test cases
//!
//! Element names in selectors and tag lists use Clark notation (`{namespace}LocalName`), the
//! same form produced by [`count_tags`](crate::xml::count_tags).

// Request fixtures, SPEKE v2 DASH requests for Preset Video 1 / Preset Audio 1 without key rotation
pub const GENERIC_WIDEVINE_TEST_FILE: &str =
    "1_generic_spekev2_dash_widevine_preset_video_1_audio_1_no_rotation.xml";
pub const GENERIC_PLAYREADY_TEST_FILE: &str =
    "2_spekev2_dash_playready_preset_video_1_audio_1_no_rotation.xml";
pub const WIDEVINE_PLAYREADY_TEST_FILE: &str =
    "3_spekev2_dash_widevine_playready_preset_video_1_audio_1_no_rotation.xml";
pub const WIDEVINE_PSSH_CPD_TEST_FILE: &str =
    "7_spekev2_dash_widevine_preset_video_1_audio_1_no_rotation_pssh_cpd.xml";
pub const PLAYREADY_PSSH_CPD_TEST_FILE: &str =
    "8_spekev2_dash_playready_preset_video_1_audio_1_no_rotation_pssh_cpd.xml";
pub const PLAYREADY_PSSH_HLSSIGNALINGDATA_TEST_FILE: &str =
    "9_spekev2_dash_playready_preset_video_1_audio_1_no_rotation_pssh_signallingdata.xml";
/// Carries an unsupported CPIX `version`; a conforming key provider rejects it
pub const WRONG_VERSION_TEST_FILE: &str = "4_negative_wrong_version_spekev2_dash_widevine.xml";

pub const ALL_TEST_FILES: &[&str] = &[
    GENERIC_WIDEVINE_TEST_FILE,
    GENERIC_PLAYREADY_TEST_FILE,
    WIDEVINE_PLAYREADY_TEST_FILE,
    WRONG_VERSION_TEST_FILE,
    WIDEVINE_PSSH_CPD_TEST_FILE,
    PLAYREADY_PSSH_CPD_TEST_FILE,
    PLAYREADY_PSSH_HLSSIGNALINGDATA_TEST_FILE,
];

pub const SPEKE_V2_REQUEST_HEADERS: &[(&str, &str)] = &[
    ("x-speke-version", "2.0"),
    ("content-type", "application/xml"),
];

pub const CPIX_NAMESPACE: &str = "urn:dashif:org:cpix";
pub const PSKC_NAMESPACE: &str = "urn:ietf:params:xml:ns:keyprov:pskc";

pub const SPEKE_V2_MANDATORY_NAMESPACES: &[(&str, &str)] =
    &[("cpix", CPIX_NAMESPACE), ("pskc", PSKC_NAMESPACE)];

pub const SPEKE_V2_CONTENTKEY_COMMONENCRYPTIONSCHEME_ALLOWED_VALUES: &[&str] =
    &["cenc", "cbc1", "cens", "cbcs"];

pub const SPEKE_V2_SUPPORTED_INTENDED_TRACK_TYPES: &[&str] = &["VIDEO", "AUDIO"];

pub const SPEKE_V2_MANDATORY_ELEMENTS_LIST: &[&str] = &[
    "./{urn:dashif:org:cpix}ContentKeyList",
    "./{urn:dashif:org:cpix}DRMSystemList",
    "./{urn:dashif:org:cpix}ContentKeyUsageRuleList",
    "./{urn:dashif:org:cpix}ContentKey",
    "./{urn:dashif:org:cpix}DRMSystem",
    "./{urn:dashif:org:cpix}ContentKeyUsageRule",
];

pub const SPEKE_V2_MANDATORY_FILTER_ELEMENTS_LIST: &[&str] = &[
    "./{urn:dashif:org:cpix}VideoFilter",
    "./{urn:dashif:org:cpix}AudioFilter",
];

/// Selector and the attributes every matching element must carry
pub const SPEKE_V2_MANDATORY_ATTRIBUTES_LIST: &[(&str, &[&str])] = &[
    (
        "./{urn:dashif:org:cpix}ContentKey",
        &["kid", "commonEncryptionScheme"],
    ),
    ("./{urn:dashif:org:cpix}DRMSystem", &["kid", "systemId"]),
    (
        "./{urn:dashif:org:cpix}ContentKeyUsageRule",
        &["kid", "intendedTrackType"],
    ),
];

pub const SPEKE_V2_GENERIC_RESPONSE_ELEMENT_LIST: &[&str] = &[
    "{urn:ietf:params:xml:ns:keyprov:pskc}PlainValue",
    "{urn:ietf:params:xml:ns:keyprov:pskc}Secret",
    "{urn:dashif:org:cpix}Data",
    "{urn:dashif:org:cpix}ContentKey",
    "{urn:dashif:org:cpix}ContentKeyList",
    "{urn:dashif:org:cpix}PSSH",
    "{urn:dashif:org:cpix}DRMSystem",
    "{urn:dashif:org:cpix}DRMSystemList",
    "{urn:dashif:org:cpix}VideoFilter",
    "{urn:dashif:org:cpix}ContentKeyUsageRule",
    "{urn:dashif:org:cpix}AudioFilter",
    "{urn:dashif:org:cpix}ContentKeyUsageRuleList",
    "{urn:dashif:org:cpix}CPIX",
];

/// Local element name and the attributes it carries in a generic response
pub const SPEKE_V2_GENERIC_RESPONSE_ATTRIBS_DICT: &[(&str, &[&str])] = &[
    ("CPIX", &["contentId", "version"]),
    ("ContentKey", &["kid", "commonEncryptionScheme"]),
    ("DRMSystem", &["kid", "systemId"]),
    ("ContentKeyUsageRule", &["kid", "intendedTrackType"]),
];

/// Values of `HLSSignalingData@playlist`
pub const SPEKE_V2_HLS_SIGNALING_DATA_PLAYLIST_MANDATORY_ATTRIBS: &[&str] = &["media", "master"];

pub const WIDEVINE_SYSTEM_ID: &str = "edef8ba9-79d6-4ace-a3c8-27dcd51d21ed";
pub const PLAYREADY_SYSTEM_ID: &str = "9a04f079-9840-4286-ab92-e65be0885f95";

/// `{urn:dashif:org:cpix}<local>`
pub fn cpix_tag(local: &str) -> String {
    format!("{{{}}}{}", CPIX_NAMESPACE, local)
}

/// `{urn:ietf:params:xml:ns:keyprov:pskc}<local>`
pub fn pskc_tag(local: &str) -> String {
    format!("{{{}}}{}", PSKC_NAMESPACE, local)
}

/// Attributes required on a generic response element with the given local name
pub fn generic_response_attributes(local: &str) -> Option<&'static [&'static str]> {
    SPEKE_V2_GENERIC_RESPONSE_ATTRIBS_DICT
        .iter()
        .find(|(name, _)| *name == local)
        .map(|(_, attributes)| *attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_use_the_cpix_namespace() {
        for selector in SPEKE_V2_MANDATORY_ELEMENTS_LIST
            .iter()
            .chain(SPEKE_V2_MANDATORY_FILTER_ELEMENTS_LIST)
            .chain(SPEKE_V2_MANDATORY_ATTRIBUTES_LIST.iter().map(|(s, _)| s))
        {
            let local = selector
                .strip_prefix("./")
                .and_then(|s| s.strip_prefix(&format!("{{{}}}", CPIX_NAMESPACE)))
                .unwrap_or_else(|| panic!("unexpected selector {}", selector));
            assert_eq!(format!("./{}", cpix_tag(local)), *selector);
        }
    }

    #[test]
    fn generic_response_tags_are_qualified() {
        assert_eq!(SPEKE_V2_GENERIC_RESPONSE_ELEMENT_LIST.len(), 13);
        assert!(SPEKE_V2_GENERIC_RESPONSE_ELEMENT_LIST.contains(&cpix_tag("CPIX").as_str()));
        assert!(SPEKE_V2_GENERIC_RESPONSE_ELEMENT_LIST.contains(&pskc_tag("Secret").as_str()));
    }

    #[test]
    fn attribute_lookup() {
        assert_eq!(
            generic_response_attributes("DRMSystem"),
            Some(&["kid", "systemId"][..])
        );
        assert_eq!(generic_response_attributes("PSSH"), None);
    }
}
