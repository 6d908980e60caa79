//! Client construction and fetch protocol tests
//!
//! All requests go through a scripted gateway, so every test can assert
//! exactly which URLs were requested and in what order.

mod helpers;

use exomast::services::persistence_cache::cache_file_name;
use exomast::services::JUPITER_RADIUS_IN_SOLAR_RADII;
use exomast::{
    CacheStatus, Collection, ExoMastClient, ExomastError, MissionId, PropertiesOutcome,
    Resolution, SpectrumLayout,
};
use helpers::{test_options, ScriptedGateway, API_BASE};
use serde_json::json;
use tempfile::TempDir;

const HD189_IDENTIFIERS: &str = r#"{
    "canonicalName": "HD 189733 b",
    "starName": "HD 189733",
    "ra": 300.1821249961853,
    "dec": 22.71146111064487,
    "planetNames": ["HD 189733 b", "HIP 98505 b", "V452 Vul b"],
    "keplerID": null,
    "keplerTCE": null,
    "tessID": 256364928,
    "tessTCE": null
}"#;

const HD189_PROPERTIES: &str = r#"[{
    "planet_name": "HD 189733 b",
    "Rp": 1.138,
    "Rs": 0.805,
    "orbital_period": 2.21857567,
    "a/Rs": 8.83602,
    "transit_depth": 0.0241,
    "eccentricity": 0.0
}]"#;

fn hd189_gateway() -> ScriptedGateway {
    ScriptedGateway::new()
        .respond("/exoplanets/identifiers/?name=hd189733b", HD189_IDENTIFIERS)
        .respond("/exoplanets/identifiers/?name=HD%20189733%20b", HD189_IDENTIFIERS)
        .respond("/exoplanets/HD%20189733%20b/properties", HD189_PROPERTIES)
}

// =============================================================================
// Construction: identity resolution, properties, cache
// =============================================================================

#[test]
fn test_construction_renames_to_canonical_name() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = hd189_gateway();

    let client =
        ExoMastClient::with_gateway("hd189733b", gateway.clone(), test_options(cache_dir.path(), false))
            .unwrap();

    let record = client.record();
    assert_eq!(record.input_name(), "hd189733b");
    assert_eq!(record.canonical_name(), "HD 189733 b");
    assert_eq!(record.url_name(), "HD%20189733%20b");
    assert!(record.is_canonicalized());
    assert_eq!(record.identifiers()["tessID"], json!(256364928));

    assert_eq!(
        gateway.requests(),
        vec![
            format!("{}/exoplanets/identifiers/?name=hd189733b", API_BASE),
            format!("{}/exoplanets/HD%20189733%20b/properties", API_BASE),
        ]
    );

    assert_eq!(client.cache_status(), CacheStatus::Miss);
    assert!(cache_dir.path().join(cache_file_name("HD 189733 b")).exists());
    assert!(cache_dir.path().join("HD_189733_b.exomast.json").exists());
}

#[test]
fn test_second_construction_hits_cache_for_same_canonical_name() {
    let cache_dir = TempDir::new().unwrap();

    let first =
        ExoMastClient::with_gateway("hd189733b", hd189_gateway(), test_options(cache_dir.path(), false))
            .unwrap();

    let gateway = hd189_gateway();
    let second = ExoMastClient::with_gateway(
        "HD 189733 b",
        gateway.clone(),
        test_options(cache_dir.path(), false),
    )
    .unwrap();

    assert_eq!(second.cache_status(), CacheStatus::Hit);
    assert_eq!(gateway.count_matching("/properties"), 0);
    assert_eq!(gateway.request_count(), 1);

    assert_eq!(second.record().input_name(), "HD 189733 b");
    assert_eq!(second.record().properties(), first.record().properties());
}

#[test]
fn test_properties_are_flattened_and_typed() {
    let cache_dir = TempDir::new().unwrap();
    let client =
        ExoMastClient::with_gateway("hd189733b", hd189_gateway(), test_options(cache_dir.path(), false))
            .unwrap();

    let props = client.record().properties();
    assert_eq!(props.a_rs(), Some(8.83602));
    assert!(props.get("a/Rs").is_none());
    assert_eq!(props.orbital_period(), Some(2.21857567));
    assert_eq!(props.eccentricity(), Some(0.0));

    let expected = 1.138 * JUPITER_RADIUS_IN_SOLAR_RADII / 0.805;
    assert_eq!(props.rp_rs(), Some(expected));
    assert!(props.is_derived("Rp_Rs"));
    assert_eq!(props.transit_depth(), Some(0.0241));
    assert_eq!(props.orbit().rp_rs, Some(expected));
}

#[test]
fn test_unknown_name_is_not_found() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::new().respond("/exoplanets/identifiers/?name=Nowhere%20b", "");

    let result =
        ExoMastClient::with_gateway("Nowhere b", gateway.clone(), test_options(cache_dir.path(), false));

    assert!(matches!(result, Err(ExomastError::NotFound(_))));
    assert_eq!(gateway.request_count(), 1);
}

#[test]
fn test_internal_server_error_is_service_error() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::new().respond(
        "/exoplanets/identifiers/?name=WASP-43%20b",
        "<html><title>500 Internal Server Error</title></html>",
    );

    let result = ExoMastClient::with_gateway("WASP-43 b", gateway, test_options(cache_dir.path(), false));

    match result {
        Err(ExomastError::Service { url, .. }) => {
            assert_eq!(url, format!("{}/exoplanets/identifiers/?name=WASP-43%20b", API_BASE));
        }
        Err(other) => panic!("expected service error, got {other}"),
        Ok(_) => panic!("expected service error"),
    }
}

#[test]
fn test_ambiguous_identifiers_select_by_index() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::new().respond(
        "/exoplanets/identifiers/?name=Kepler-1",
        r#"[{"canonicalName": "Kepler-1 b"}, {"canonicalName": "Kepler-10 b"}]"#,
    );

    let mut client =
        ExoMastClient::with_gateway("Kepler-1", gateway, test_options(cache_dir.path(), true)).unwrap();

    let err = client.get_identifiers(2).unwrap_err();
    assert!(matches!(err, ExomastError::IndexOutOfRange { index: 2, len: 2, .. }));
    assert_eq!(client.record().canonical_name(), "Kepler-1");

    let resolution = client.get_identifiers(0).unwrap();
    assert_eq!(
        resolution,
        Resolution::Renamed {
            from: "Kepler-1".to_string(),
            to: "Kepler-1 b".to_string()
        }
    );
}

#[test]
fn test_stale_cache_is_refetched_and_overwritten() {
    let cache_dir = TempDir::new().unwrap();
    let stale_path = cache_dir.path().join("HD_189733_b.exomast.json");
    std::fs::write(
        &stale_path,
        r#"{"format_version": 0, "saved_at": "2019-05-01T00:00:00Z", "record": {"legacy": true}}"#,
    )
    .unwrap();

    let gateway = hd189_gateway();
    let client =
        ExoMastClient::with_gateway("hd189733b", gateway.clone(), test_options(cache_dir.path(), false))
            .unwrap();

    assert_eq!(client.cache_status(), CacheStatus::Stale);
    assert_eq!(gateway.count_matching("/properties"), 1);

    let rewritten = std::fs::read_to_string(&stale_path).unwrap();
    assert!(rewritten.contains("\"format_version\": 1"));
}

// =============================================================================
// Property aggregation
// =============================================================================

#[test]
fn test_empty_properties_array_is_not_an_error() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::new()
        .respond("/exoplanets/identifiers/?name=TOI-700%20d", r#"{"canonicalName": "TOI-700 d"}"#)
        .respond("/exoplanets/TOI-700%20d/properties", "[]");

    let mut client =
        ExoMastClient::with_gateway("TOI-700 d", gateway, test_options(cache_dir.path(), false)).unwrap();

    assert!(client.record().properties().is_empty());
    assert_eq!(client.get_properties(0).unwrap(), PropertiesOutcome::NoneAvailable);
}

#[test]
fn test_properties_index_out_of_range() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = hd189_gateway();
    let mut client =
        ExoMastClient::with_gateway("hd189733b", gateway, test_options(cache_dir.path(), false)).unwrap();

    let err = client.get_properties(1).unwrap_err();
    assert!(matches!(err, ExomastError::IndexOutOfRange { what: "properties", index: 1, len: 1 }));
}

#[test]
fn test_refetching_properties_is_idempotent() {
    let cache_dir = TempDir::new().unwrap();
    let mut client =
        ExoMastClient::with_gateway("hd189733b", hd189_gateway(), test_options(cache_dir.path(), false))
            .unwrap();

    let once = client.record().properties().clone();
    client.get_properties(0).unwrap();
    client.get_properties(0).unwrap();

    assert_eq!(client.record().properties(), &once);
    assert_eq!(client.record().properties().derived_keys().count(), 1);
}

#[test]
fn test_served_radius_ratio_wins_over_derivation() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::new()
        .respond("/exoplanets/identifiers/?name=WASP-12%20b", r#"{"canonicalName": "WASP-12 b"}"#)
        .respond(
            "/exoplanets/WASP-12%20b/properties",
            r#"{"Rp": 1.9, "Rs": 1.6, "Rp/Rs": 0.1170}"#,
        );

    let client =
        ExoMastClient::with_gateway("WASP-12 b", gateway, test_options(cache_dir.path(), false)).unwrap();

    assert_eq!(client.record().properties().rp_rs(), Some(0.1170));
    assert!(!client.record().properties().is_derived("Rp_Rs"));
}

#[test]
fn test_served_null_radius_ratio_is_kept() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::new()
        .respond("/exoplanets/identifiers/?name=WASP-12%20b", r#"{"canonicalName": "WASP-12 b"}"#)
        .respond(
            "/exoplanets/WASP-12%20b/properties",
            r#"{"Rp": 1.9, "Rs": 1.6, "Rp/Rs": null}"#,
        );

    let client =
        ExoMastClient::with_gateway("WASP-12 b", gateway, test_options(cache_dir.path(), false)).unwrap();

    let props = client.record().properties();
    assert_eq!(props.get("Rp_Rs"), Some(&serde_json::Value::Null));
    assert!(!props.is_derived("Rp_Rs"));
    assert_eq!(props.derived_keys().count(), 0);
}

// =============================================================================
// Mission-data fetchers
// =============================================================================

#[test]
fn test_mission_fetchers_refuse_non_mission_planets() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::new();
    let mut client =
        ExoMastClient::with_gateway("HD 209458 b", gateway.clone(), test_options(cache_dir.path(), true))
            .unwrap();

    assert_eq!(client.record().collection(), Collection::None);
    assert!(matches!(client.get_tce(), Err(ExomastError::Configuration(_))));
    assert!(matches!(client.get_metadata(1), Err(ExomastError::Configuration(_))));
    assert!(matches!(client.get_detrended_table(1), Err(ExomastError::Configuration(_))));
    assert!(matches!(client.get_phase_plot(1, false), Err(ExomastError::Configuration(_))));

    assert_eq!(gateway.request_count(), 0);
    assert!(client.record().tce().is_none());
}

#[test]
fn test_kepler_mission_fetchers() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::new()
        .respond("/dvdata/kepler/12557548/tces/", r#"{"TCE": ["TCE_1", "TCE_2"]}"#)
        .respond(
            "/dvdata/kepler/12557548/info/?tce=2",
            r#"{"Transit Depth": 0.5, "Orbital Period": 0.6538, "TCE": "TCE_2"}"#,
        )
        .respond("/dvdata/kepler/12557548/table/?tce=1", r#"{"data": [[1.0, 0.99]]}"#)
        .respond("/dvdata/kepler/12557548/phaseplot/?tce=1", r#"{"div": "plain"}"#)
        .respond("/dvdata/kepler/12557548/phaseplot/?tce=1&embed", r#"{"div": "embedded"}"#);

    let mut client =
        ExoMastClient::with_gateway("KIC12557548", gateway.clone(), test_options(cache_dir.path(), true))
            .unwrap();

    assert_eq!(client.cache_status(), CacheStatus::Deferred);
    assert_eq!(client.record().collection(), Collection::Kepler);
    assert_eq!(client.record().mission_id(), Some(&MissionId::Numeric(12557548)));
    assert!(client.record().phase_plot().is_none());

    assert_eq!(client.get_tce().unwrap()["TCE"][1], json!("TCE_2"));

    let metadata = client.get_metadata(2).unwrap();
    assert_eq!(metadata["Transit_Depth"], json!(0.5));
    assert_eq!(metadata["Orbital_Period"], json!(0.6538));
    assert_eq!(client.record().metadata().unwrap()["Transit Depth"], json!(0.5));

    assert_eq!(client.get_detrended_table(1).unwrap()["data"][0][1], json!(0.99));

    assert_eq!(client.get_phase_plot(1, false).unwrap()["div"], json!("plain"));
    assert_eq!(client.get_phase_plot(1, true).unwrap()["div"], json!("embedded"));

    assert_eq!(gateway.request_count(), 5);
}

#[test]
fn test_mission_without_catalog_number() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = ScriptedGateway::new().respond("/dvdata/kepler/info", r#"{"Mission": "Kepler"}"#);

    let mut client = ExoMastClient::with_gateway(
        "Kepler KOI-13 b",
        gateway.clone(),
        test_options(cache_dir.path(), true),
    )
    .unwrap();

    assert!(matches!(client.get_tce(), Err(ExomastError::Configuration(_))));
    assert_eq!(gateway.request_count(), 0);

    assert_eq!(client.get_metadata(1).unwrap()["Mission"], json!("Kepler"));
    assert_eq!(gateway.requests(), vec![format!("{}/dvdata/kepler/info", API_BASE)]);
}

// =============================================================================
// Spectra
// =============================================================================

fn spectrum_gateway() -> ScriptedGateway {
    ScriptedGateway::new()
        .respond(
            "/spectra/WASP-43%20b/filelist/",
            r#"{"filenames": ["WASP-43b_transmission.txt", "WASP-43b_emission.txt"]}"#,
        )
        .respond(
            "/spectra/WASP-43%20b/file/WASP-43b_transmission.txt",
            "# comment\n1.0 0.1 0.002 0.0001\n2.0 0.1 0.003 0.0002\n",
        )
        .respond(
            "/spectra/WASP-43%20b/file/WASP-43b_emission.txt",
            "# wave depth err\n1.1 0.0004 0.00005\n",
        )
        .respond("/spectra/WASP-43%20b/plot/", r#"{"script": "bokeh"}"#)
}

#[test]
fn test_spectrum_file_list_is_fetched_once() {
    let cache_dir = TempDir::new().unwrap();
    let gateway = spectrum_gateway();
    let mut client =
        ExoMastClient::with_gateway("WASP-43 b", gateway.clone(), test_options(cache_dir.path(), true))
            .unwrap();

    let table = client.get_spectrum(0, SpectrumLayout::WithDelta).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.columns.len(), 4);

    let table = client.get_spectrum(1, SpectrumLayout::WithoutDelta).unwrap();
    assert_eq!(table.rows, vec![vec![1.1, 0.0004, 0.00005]]);
    let (x, y, yerr) = table.errorbar_series().unwrap();
    assert_eq!((x, y, yerr), (vec![1.1], vec![0.0004], vec![0.00005]));

    assert_eq!(gateway.count_matching("/filelist/"), 1);
    assert_eq!(gateway.request_count(), 3);
}

#[test]
fn test_spectrum_index_out_of_range() {
    let cache_dir = TempDir::new().unwrap();
    let mut client =
        ExoMastClient::with_gateway("WASP-43 b", spectrum_gateway(), test_options(cache_dir.path(), true))
            .unwrap();

    let err = client.get_spectrum(2, SpectrumLayout::WithDelta).unwrap_err();
    assert!(matches!(err, ExomastError::IndexOutOfRange { what: "spectrum file", index: 2, len: 2 }));
    assert!(client.record().spectrum_table().is_none());
}

#[test]
fn test_spectrum_plot_payload() {
    let cache_dir = TempDir::new().unwrap();
    let mut client =
        ExoMastClient::with_gateway("WASP-43 b", spectrum_gateway(), test_options(cache_dir.path(), true))
            .unwrap();

    assert_eq!(client.get_spectrum_plot().unwrap()["script"], json!("bokeh"));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_save_and_load_round_trip_through_client() {
    let cache_dir = TempDir::new().unwrap();
    let mut client =
        ExoMastClient::with_gateway("WASP-43 b", spectrum_gateway(), test_options(cache_dir.path(), true))
            .unwrap();

    client.get_spectrum(0, SpectrumLayout::WithDelta).unwrap();
    client.get_spectrum_plot().unwrap();
    let before = client.record().clone();

    client.save().unwrap();
    client.get_spectrum(1, SpectrumLayout::WithoutDelta).unwrap();
    assert_ne!(client.record(), &before);

    client.load().unwrap();
    assert_eq!(client.record(), &before);
}

#[test]
fn test_concurrent_handles_share_one_cache_entry() {
    let cache_dir = TempDir::new().unwrap();
    let cache_path = cache_dir.path().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let gateway = hd189_gateway();
            let options = test_options(&cache_path, false);
            std::thread::spawn(move || {
                ExoMastClient::with_gateway("hd189733b", gateway, options).map(|c| c.into_record())
            })
        })
        .collect();

    for handle in handles {
        let record = handle.join().unwrap().unwrap();
        assert_eq!(record.canonical_name(), "HD 189733 b");
    }

    assert!(cache_dir.path().join("HD_189733_b.exomast.json").exists());
}
