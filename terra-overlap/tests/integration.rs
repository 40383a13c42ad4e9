//! Tests d'intégration: scénarios complets filtre -> intersection -> agrégation

use geo::{Area, BoundingRect, Geometry};
use terra_overlap::{
    area_m2, breakdown_by_region, filter_by_region, intersect_all, recompute, total_area_km2,
    FeatureCollection, Inputs, RegionKeys, RegionSelection,
};

const SQUARE_A: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]},
        "properties": {"sigla_uf": "X"}
    }]
}"#;

const SQUARE_B: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "geometry": {"type": "Polygon", "coordinates": [[[1,1],[3,1],[3,3],[1,3],[1,1]]]},
        "properties": {"sigla_uf": "Y"}
    }]
}"#;

const IMOVEIS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {"sigla_uf": "PA", "cod_imovel": "PA-1"},
         "geometry": {"type": "Polygon", "coordinates": [[[-52,-4],[-51,-4],[-51,-3],[-52,-3],[-52,-4]]]}},
        {"type": "Feature", "properties": {"UF": "PA", "cod_imovel": "PA-2"},
         "geometry": {"type": "Polygon", "coordinates": [[[-50.5,-4],[-49.5,-4],[-49.5,-3],[-50.5,-3],[-50.5,-4]]]}},
        {"type": "Feature", "properties": {"estado": "AM", "cod_imovel": "AM-1"},
         "geometry": {"type": "MultiPolygon", "coordinates": [
            [[[-63,-4],[-62,-4],[-62,-3],[-63,-3],[-63,-4]]],
            [[[-61,-4],[-60.5,-4],[-60.5,-3.5],[-61,-3.5],[-61,-4]]]
         ]}},
        {"type": "Feature", "properties": {"sigla_uf": "MG", "cod_imovel": "MG-broken"},
         "geometry": {"type": "Polygon", "coordinates": [[]]}},
        {"type": "Feature", "properties": {"sigla_uf": "MG", "cod_imovel": "MG-bowtie"},
         "geometry": {"type": "Polygon", "coordinates": [[[-45,-19],[-44,-18],[-44,-19],[-45,-18],[-45,-19]]]}}
    ]
}"#;

const TERRAS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {"sigla_uf": "PA", "terrai_nom": "TI Norte"},
         "geometry": {"type": "Polygon", "coordinates": [[[-51.5,-3.5],[-50,-3.5],[-50,-2],[-51.5,-2],[-51.5,-3.5]]]}},
        {"type": "Feature", "properties": {"sigla_uf": "AM", "terrai_nom": "TI Oeste"},
         "geometry": {"type": "Polygon", "coordinates": [[[-62.5,-3.8],[-60.8,-3.8],[-60.8,-2],[-62.5,-2],[-62.5,-3.8]]]}},
        {"type": "Feature", "properties": {"sigla_uf": "MG", "terrai_nom": "TI Sul"},
         "geometry": {"type": "Polygon", "coordinates": [[[-44.8,-18.9],[-44.2,-18.9],[-44.2,-18.1],[-44.8,-18.1],[-44.8,-18.9]]]}}
    ]
}"#;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn test_overlapping_squares_scenario() {
    let a = FeatureCollection::from_geojson_str(SQUARE_A).unwrap();
    let b = FeatureCollection::from_geojson_str(SQUARE_B).unwrap();

    let result = intersect_all(&a, &b);
    assert_eq!(result.len(), 1);

    let geometry = result.features[0].geometry.as_ref().unwrap();
    assert!(matches!(geometry, Geometry::Polygon(_)));
    assert!((geometry.unsigned_area() - 1.0).abs() < 1e-9);
    let rect = geometry.bounding_rect().unwrap();
    assert!((rect.min().x - 1.0).abs() < 1e-9);
    assert!((rect.min().y - 1.0).abs() < 1e-9);
    assert!((rect.max().x - 2.0).abs() < 1e-9);
    assert!((rect.max().y - 2.0).abs() < 1e-9);

    let keys = RegionKeys::default();
    let only_x: RegionSelection = ["X"].into_iter().collect();
    let only_y: RegionSelection = ["Y"].into_iter().collect();
    assert_eq!(filter_by_region(&a, &only_x, &keys), Some(a.clone()));
    assert!(filter_by_region(&a, &only_y, &keys).unwrap().is_empty());
}

#[test]
fn test_fallback_key_resolves_region() {
    let fc = FeatureCollection::from_geojson_str(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":null,"properties":{"UF":"PA"}}
        ]}"#,
    )
    .unwrap();
    let keys = RegionKeys::default();
    assert_eq!(keys.region_of(&fc.features[0]), "PA");

    let pa: RegionSelection = ["PA"].into_iter().collect();
    assert_eq!(filter_by_region(&fc, &pa, &keys).unwrap().len(), 1);
}

#[test]
fn test_malformed_feature_area_is_zero() {
    let imoveis = FeatureCollection::from_geojson_str(IMOVEIS).unwrap();
    assert_eq!(area_m2(&imoveis.features[3]), 0.0);
}

#[test]
fn test_intersection_bounded_and_commutative() {
    let imoveis = FeatureCollection::from_geojson_str(IMOVEIS).unwrap();
    let terras = FeatureCollection::from_geojson_str(TERRAS).unwrap();

    let forward = intersect_all(&imoveis, &terras);
    let backward = intersect_all(&terras, &imoveis);

    let inter = total_area_km2(&forward);
    assert!(inter > 0.0);
    assert!(inter <= total_area_km2(&imoveis).min(total_area_km2(&terras)) + 1e-6);
    assert!(close(inter, total_area_km2(&backward)));

    // AM-1 touche TI Oeste par ses deux parties: une seule feature pour la paire.
    // Le nœud papillon MG, d'aire nulle, ne recoupe rien.
    let codes: Vec<&str> = forward
        .iter()
        .filter_map(|f| f.properties.get("cod_imovel").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(codes, vec!["PA-1", "PA-2", "AM-1"]);
    assert!(matches!(
        forward.features[2].geometry,
        Some(Geometry::MultiPolygon(_))
    ));
}

#[test]
fn test_filter_then_intersect_per_region() {
    let imoveis = FeatureCollection::from_geojson_str(IMOVEIS).unwrap();
    let terras = FeatureCollection::from_geojson_str(TERRAS).unwrap();
    let keys = RegionKeys::default();

    let pa: RegionSelection = ["PA"].into_iter().collect();
    let left = filter_by_region(&imoveis, &pa, &keys);
    let right = filter_by_region(&terras, &pa, &keys);
    let result = intersect_all(left.as_ref(), right.as_ref());
    assert_eq!(result.len(), 2);

    let am: RegionSelection = ["AM"].into_iter().collect();
    let left = filter_by_region(&imoveis, &am, &keys);
    let result = intersect_all(left.as_ref(), filter_by_region(&terras, &pa, &keys).as_ref());
    assert!(result.is_empty());
}

#[test]
fn test_breakdown_matches_filter() {
    let imoveis = FeatureCollection::from_geojson_str(IMOVEIS).unwrap();
    let keys = RegionKeys::default();
    let codes = ["AM", "PA", "MG"];

    let breakdown = breakdown_by_region(&imoveis, &codes, &keys);
    let all: RegionSelection = codes.into_iter().collect();
    assert_eq!(
        breakdown.total_count(),
        filter_by_region(&imoveis, &all, &keys).unwrap().len()
    );
    assert_eq!(breakdown.get("MG").unwrap().count, 2);
}

#[test]
fn test_recompute_snapshot() {
    let imoveis = FeatureCollection::from_geojson_str(IMOVEIS).unwrap();
    let terras = FeatureCollection::from_geojson_str(TERRAS).unwrap();
    let catalog = vec!["AM".to_string(), "PA".to_string(), "MG".to_string()];
    let keys = RegionKeys::default();
    let selection = RegionSelection::all();

    let snapshot = recompute(Inputs {
        left: Some(&imoveis),
        right: Some(&terras),
        selection: &selection,
        catalog: &catalog,
        keys: &keys,
    });

    assert!(close(snapshot.left_km2, total_area_km2(&imoveis)));
    assert!(close(snapshot.right_km2, total_area_km2(&terras)));
    assert_eq!(snapshot.left_by_region.total_count(), 5);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert!(json.get("intersection_km2").is_some());
    assert!(json.get("left").is_none());
}
