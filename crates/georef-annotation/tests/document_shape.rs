use georef_annotation::{
    Annotation, AnnotationPage, ImageApiVersion, ResourceDescriptor, build_annotation_with_id,
};
use georef_core::{GeoPoint, ImageSize, Pt2};
use georef_linear::Transformation;
use serde_json::json;

fn sample() -> Annotation {
    let resource = ResourceDescriptor::image_service(
        "https://iiif.example.org/iiif/map-1/",
        ImageApiVersion::V3,
        ImageSize::new(4000, 6000),
    );
    build_annotation_with_id(
        "https://iiif.example.org/iiif/map-1#1700000000000-abc123".to_string(),
        &resource,
        &[
            Pt2::new(400.0, 1200.0),
            Pt2::new(3600.5, 1200.0),
            Pt2::new(2000.0, 5000.126),
        ],
        &[
            GeoPoint::new(35.684, 139.762),
            GeoPoint::new(35.684, 139.773),
            GeoPoint::new(35.678, 139.7675),
        ],
        Transformation::ThinPlateSpline,
    )
    .unwrap()
}

#[test]
fn annotation_json_layout() {
    let v = serde_json::to_value(sample()).unwrap();
    assert_eq!(
        v,
        json!({
            "@context": [
                "http://iiif.io/api/extension/georef/1/context.json",
                "http://iiif.io/api/presentation/3/context.json"
            ],
            "id": "https://iiif.example.org/iiif/map-1#1700000000000-abc123",
            "type": "Annotation",
            "motivation": "georeferencing",
            "target": {
                "type": "SpecificResource",
                "source": {
                    "id": "https://iiif.example.org/iiif/map-1",
                    "type": "ImageService3",
                    "width": 4000,
                    "height": 6000
                },
                "selector": {
                    "type": "SvgSelector",
                    "value": "<svg width=\"4000\" height=\"6000\"><polygon points=\"400.00,1200.00 3600.50,1200.00 2000.00,5000.13\"/></svg>"
                }
            },
            "body": {
                "type": "FeatureCollection",
                "transformation": { "type": "thinPlateSpline" },
                "features": [
                    {
                        "type": "Feature",
                        "properties": { "resourceCoords": [400.0, 1200.0] },
                        "geometry": { "type": "Point", "coordinates": [139.762, 35.684] }
                    },
                    {
                        "type": "Feature",
                        "properties": { "resourceCoords": [3600.5, 1200.0] },
                        "geometry": { "type": "Point", "coordinates": [139.773, 35.684] }
                    },
                    {
                        "type": "Feature",
                        "properties": { "resourceCoords": [2000.0, 5000.126] },
                        "geometry": { "type": "Point", "coordinates": [139.7675, 35.678] }
                    }
                ]
            }
        })
    );
}

#[test]
fn annotation_survives_json() {
    let a = sample();
    let text = serde_json::to_string_pretty(&a).unwrap();
    let back: Annotation = serde_json::from_str(&text).unwrap();
    assert_eq!(back.id, a.id);
    assert_eq!(back.resource(), a.resource());
    assert_eq!(back.transformation(), a.transformation());
    assert_eq!(back.target.selector, a.target.selector);
    for (g, h) in back.gcps().iter().zip(a.gcps()) {
        assert!((g.resource - h.resource).norm() < 1e-9);
        assert!(g.geo.planar_distance(&h.geo) < 1e-12);
    }
}

#[test]
fn page_wraps_items_in_order() {
    let first = sample();
    let mut second = sample();
    second.id = "https://iiif.example.org/iiif/map-1#1700000000001-zzzzzz".to_string();
    let page = AnnotationPage::new(vec![first.clone(), second.clone()]);

    let v = serde_json::to_value(&page).unwrap();
    assert_eq!(v["@context"], "http://www.w3.org/ns/anno.jsonld");
    assert_eq!(v["type"], "AnnotationPage");
    assert_eq!(v["items"][0]["id"], first.id.as_str());
    assert_eq!(v["items"][1]["id"], second.id.as_str());
}
