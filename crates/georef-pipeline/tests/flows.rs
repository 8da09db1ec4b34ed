use anyhow::{Result, bail};
use georef_annotation::ImageServiceInfo;
use georef_core::Pt2;
use georef_pipeline::capture::{CanvasSource, ServiceSource};
use georef_pipeline::{
    EditorSnapshot, GeoPoint, GeorefSession, ImageSize, NoFallback, ProjectProblem,
    ProjectionConfig, Quadrilateral, ResourceSources, SimpleCrs, SingleSaveProblem,
    Transformation, WebMercator, run_save, run_save_item, step_build, step_clear, step_register,
    step_remove_item, step_resolve_resource,
};

fn scenario_corners() -> Quadrilateral {
    Quadrilateral::new(
        GeoPoint::new(10.0, 10.0),
        GeoPoint::new(10.0, 20.0),
        GeoPoint::new(0.0, 10.0),
        GeoPoint::new(0.0, 20.0),
    )
}

fn canvas_sources() -> ResourceSources {
    ResourceSources {
        image_service: None,
        canvas: Some(CanvasSource {
            id: "https://example.org/canvas/1".into(),
            manifest: Some("https://example.org/manifest.json".into()),
        }),
        width: Some(800),
        height: Some(400),
    }
}

fn snapshot(polygon: Vec<GeoPoint>) -> EditorSnapshot {
    EditorSnapshot {
        corners: scenario_corners(),
        preview: ImageSize::new(200, 100),
        polygon,
        resource: canvas_sources(),
    }
}

fn triangle() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(9.0, 11.0),
        GeoPoint::new(9.0, 19.0),
        GeoPoint::new(1.0, 15.0),
    ]
}

#[test]
fn single_save_produces_affine_annotation() {
    let mut session = GeorefSession::<SingleSaveProblem>::new();
    session.set_input(snapshot(triangle())).unwrap();
    run_save(&mut session, &NoFallback).unwrap();

    let annotation = session.export().unwrap();
    assert!(annotation.id.starts_with("https://example.org/canvas/1#"));
    assert_eq!(annotation.transformation(), Transformation::polynomial(1));
    assert_eq!(annotation.resource().part_of[0].kind, "Manifest");

    let gcps = annotation.gcps();
    let expected = [
        Pt2::new(80.0, 40.0),
        Pt2::new(720.0, 40.0),
        Pt2::new(400.0, 360.0),
    ];
    for ((gcp, px), geo) in gcps.iter().zip(expected).zip(triangle()) {
        assert!((gcp.resource - px).norm() < 1e-8, "{:?} vs {px:?}", gcp.resource);
        assert_eq!(gcp.geo, geo);
    }
    assert_eq!(
        annotation.target.selector.value,
        r#"<svg width="800" height="400"><polygon points="80.00,40.00 720.00,40.00 400.00,360.00"/></svg>"#
    );

    let ops: Vec<_> = session.log.iter().map(|e| e.operation.as_str()).collect();
    assert_eq!(ops, ["resolve_resource", "register", "build"]);
    assert_eq!(session.exports.len(), 1);
}

#[test]
fn pulled_corner_selects_thin_plate_spline_with_advisory() {
    let mut snap = snapshot(triangle());
    snap.corners.se = GeoPoint::new(-1.0, 21.5);

    let mut session = GeorefSession::<SingleSaveProblem>::new();
    session.set_input(snap).unwrap();
    run_save(&mut session, &NoFallback).unwrap();

    let output = session.require_output().unwrap();
    assert!(output.registration.classification.is_projective());
    assert_eq!(
        output.annotation.transformation(),
        Transformation::ThinPlateSpline
    );
    assert!(session.log.iter().any(|e| e.operation == "advisory"));
}

#[test]
fn mercator_config_roundtrips_the_polygon() {
    let corners = Quadrilateral::centered_rect(GeoPoint::new(35.681, 139.7675), 0.011, 0.006);
    let polygon = vec![
        GeoPoint::new(35.683, 139.764),
        GeoPoint::new(35.683, 139.771),
        GeoPoint::new(35.679, 139.771),
        GeoPoint::new(35.679, 139.764),
    ];
    let snap = EditorSnapshot {
        corners,
        preview: ImageSize::new(2400, 1600),
        polygon,
        resource: ResourceSources {
            image_service: Some(ServiceSource {
                base: "https://iiif.example.org/iiif/tokyo".into(),
                version: None,
            }),
            canvas: None,
            width: Some(9600),
            height: Some(6400),
        },
    };

    let mut session = GeorefSession::<SingleSaveProblem>::new();
    session
        .update_config(|c| c.projection = ProjectionConfig::WebMercator(WebMercator::new(16.0)))
        .unwrap();
    session.set_input(snap).unwrap();
    run_save(&mut session, &NoFallback).unwrap();

    let out = session.require_output().unwrap();
    assert_eq!(out.annotation.resource().kind, "ImageService2");
    assert_eq!(out.registration.scale.scale_x, 4.0);
    for px in &out.registration.native_pixels {
        assert!(px.x > 0.0 && px.x < 9600.0 && px.y > 0.0 && px.y < 6400.0);
    }
}

#[test]
fn project_collects_and_exports_page() {
    let mut session = GeorefSession::<ProjectProblem>::new();
    session
        .set_config(georef_pipeline::GeorefConfig {
            projection: ProjectionConfig::Simple(SimpleCrs::default()),
            ..Default::default()
        })
        .unwrap();

    session.set_input(snapshot(triangle())).unwrap();
    let first = run_save_item(&mut session, &NoFallback).unwrap();

    let mut square = triangle();
    square.push(GeoPoint::new(1.0, 11.0));
    session.set_input(snapshot(square)).unwrap();
    assert!(session.state.registration.is_none());
    let second = run_save_item(&mut session, &NoFallback).unwrap();

    let collection = session.require_output().unwrap();
    assert_eq!(collection.ids().collect::<Vec<_>>(), [first.as_str(), second.as_str()]);

    let page = session.export().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.items[1].gcps().len(), 4);

    step_remove_item(&mut session, 0).unwrap();
    assert_eq!(session.require_output().unwrap().len(), 1);
    assert!(step_remove_item(&mut session, 5).is_err());

    step_clear(&mut session);
    assert!(session.export().unwrap().is_empty());
}

#[test]
fn failed_size_lookup_keeps_saved_items() {
    let mut session = GeorefSession::<ProjectProblem>::new();
    session.set_input(snapshot(triangle())).unwrap();
    run_save_item(&mut session, &NoFallback).unwrap();

    let mut unknown = snapshot(triangle());
    unknown.resource = ResourceSources {
        image_service: Some(ServiceSource {
            base: "https://iiif.example.org/iiif/unknown".into(),
            version: None,
        }),
        ..ResourceSources::default()
    };
    session.set_input(unknown).unwrap();

    let offline = |_: &str| -> Result<ImageServiceInfo> { bail!("network unavailable") };
    assert!(step_resolve_resource(&mut session, &offline).is_err());
    assert!(step_register(&mut session).is_err());

    assert_eq!(session.require_output().unwrap().len(), 1);
    let last = session.log.last().unwrap();
    assert!(!last.success);
    assert!(last.notes.as_deref().unwrap_or("").contains("network unavailable"));
}

#[test]
fn invalid_snapshots_are_rejected() {
    let mut session = GeorefSession::<SingleSaveProblem>::new();
    assert!(
        session
            .set_input(snapshot(triangle()[..2].to_vec()))
            .is_err()
    );

    let mut empty_preview = snapshot(triangle());
    empty_preview.preview = ImageSize::new(0, 100);
    assert!(session.set_input(empty_preview).is_err());
    assert!(!session.has_input());
}

#[test]
fn session_survives_json() {
    let mut session = GeorefSession::<SingleSaveProblem>::new();
    session.set_input(snapshot(triangle())).unwrap();
    run_save(&mut session, &NoFallback).unwrap();

    let json = session.to_json().unwrap();
    let restored = GeorefSession::<SingleSaveProblem>::from_json(&json).unwrap();
    assert_eq!(
        restored.require_output().unwrap().annotation.id,
        session.require_output().unwrap().annotation.id
    );
    assert_eq!(restored.log.len(), session.log.len());
}

#[test]
fn config_change_discards_stale_registration() {
    let mut session = GeorefSession::<SingleSaveProblem>::new();
    session.set_input(snapshot(triangle())).unwrap();
    step_resolve_resource(&mut session, &NoFallback).unwrap();
    step_register(&mut session).unwrap();

    session
        .update_config(|c| {
            c.round_resource_coords = true;
            c.classifier.projective_family = georef_pipeline::ProjectiveFamily::Polynomial2;
        })
        .unwrap();
    assert!(session.state.registration.is_none());
    assert!(session.state.resource.is_none());
    assert!(step_build(&mut session).is_err());
    assert!(session.output().is_none());

    run_save(&mut session, &NoFallback).unwrap();
    for px in &session.require_output().unwrap().registration.native_pixels {
        assert_eq!(*px, Pt2::new(px.x.round(), px.y.round()));
    }
}

#[test]
fn config_change_keeps_saved_project_items() {
    let mut session = GeorefSession::<ProjectProblem>::new();
    session.set_input(snapshot(triangle())).unwrap();
    run_save_item(&mut session, &NoFallback).unwrap();

    session
        .update_config(|c| c.round_resource_coords = true)
        .unwrap();
    assert!(session.state.registration.is_none());
    assert_eq!(session.require_output().unwrap().len(), 1);

    run_save_item(&mut session, &NoFallback).unwrap();
    assert_eq!(session.require_output().unwrap().len(), 2);
}
