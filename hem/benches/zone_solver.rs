// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

use criterion::{criterion_group, criterion_main, Criterion};

use hem::elements::{BuildingElement, NodeChain, OpaqueElement};
use hem::zone::{SetpointBasis, Zone, ZoneSolveInputs};

fn sample_zone() -> Zone {
    let wall = BuildingElement::Opaque(OpaqueElement {
        name: "wall".into(),
        area: 10.0,
        pitch: 90.0,
        orientation: 0.0,
        chain: NodeChain {
            k_pli: vec![0.0, 50_000.0, 50_000.0, 0.0],
            h_pli: vec![4.0, 1.0, 4.0],
        },
        solar_absorption_coeff: 0.6,
    });
    let roof = BuildingElement::Opaque(OpaqueElement {
        name: "roof".into(),
        area: 20.0,
        pitch: 0.0,
        orientation: 0.0,
        chain: NodeChain {
            k_pli: vec![0.0, 30_000.0, 0.0],
            h_pli: vec![2.0, 2.0],
        },
        solar_absorption_coeff: 0.6,
    });
    Zone::new(
        "bench_zone".into(),
        vec![wall, roof],
        10.0,
        20.0,
        50.0,
        SetpointBasis::Operative,
        50.0,
        20.0,
    )
    .unwrap()
}

fn solve_inputs(n: usize) -> ZoneSolveInputs {
    ZoneSolveInputs {
        other_side_temps: vec![5.0; n],
        solar_flux_w_m2: vec![100.0; n],
        sky_temp_depression_active: vec![true; n],
        t_ext: 5.0,
        t_supply: 5.0,
        ach_baseline: 0.5,
        ach_windows_open: 1.5,
        ach_target: 0.5,
    }
}

fn zone_solver_benchmark(c: &mut Criterion) {
    let zone = sample_zone();
    let inputs = solve_inputs(zone.elements.len());

    c.bench_function("zone demand, fast solver", |b| {
        b.iter(|| zone.space_heat_cool_demand(&inputs, 18.0, 24.0, 25.0, 1.0, true))
    });

    c.bench_function("zone demand, naive matrix solver", |b| {
        b.iter(|| zone.space_heat_cool_demand(&inputs, 18.0, 24.0, 25.0, 1.0, false))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = zone_solver_benchmark
}
criterion_main!(benches);
