//! # Drive Control Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mars_lib::drive_ctrl::{
    AxisParams, DriveCommand, DriveCtrl, DriveMode, InputData, InputShaper, Params,
    ResponseCurve,
};
use util::module::State;

fn drive_ctrl_benchmark(c: &mut Criterion) {
    // ---- Build the controller ----

    let params = Params {
        shaping: AxisParams::new(
            InputShaper::new(0.05, ResponseCurve::Cubic { gain: 1.0 }),
            InputShaper::new(0.05, ResponseCurve::Cubic { gain: 1.0 }),
            InputShaper::new(0.05, ResponseCurve::SignedSquare { gain: 0.85 }),
        ),
        slow_scale: AxisParams::new(0.8, 0.5, 0.5),
        ramp_limit_per_cycle: AxisParams::new(0.1, 0.1, 0.1),
        initial_mode: DriveMode::Mecanum,
        zero_heading_on_mode_toggle: false,
    };

    let mut drive_ctrl = DriveCtrl::new(params).unwrap();

    let input = InputData {
        heading_deg: 37.0,
        ..Default::default()
    };

    // ---- Run one full field oriented mecanum cycle ----

    c.bench_function("drive_ctrl_cycle", |b| {
        b.iter(|| {
            drive_ctrl.drive(DriveCommand::mecanum(0.7, -0.3, 0.2).field_oriented(true));
            let (out, _) = drive_ctrl.proc(black_box(&input)).unwrap();
            black_box(out.mecanum.wheel_speeds())
        })
    });
}

criterion_group!(benches, drive_ctrl_benchmark);
criterion_main!(benches);
