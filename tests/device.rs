//! Device-backend dispatch behavior. These tests run only with the `gpu`
//! feature enabled, and skip themselves on machines without a usable
//! adapter instead of failing.

#![cfg(feature = "gpu")]

mod common;

use common::{CopyKernel, VisitKernel};
use gridexec::exec::device;
use gridexec::{DeviceGpu, HostParallel, KernelBuf, exec2d};
use rand::Rng;

fn adapter_or_skip() -> bool {
    if device::available() {
        true
    } else {
        eprintln!("no GPU adapter available; skipping");
        false
    }
}

#[test]
fn device_copy_1024x1024_matches_host() {
    if !adapter_or_skip() {
        return;
    }

    let nx = 1024;
    let ny = 1024;
    let mut rng = rand::rng();
    let f: Vec<f32> = (0..nx * ny).map(|_| rng.random::<f32>()).collect();

    let mut host_out = vec![0.0f32; nx * ny];
    let kernel = CopyKernel {
        nx,
        f: &f,
        fn_out: KernelBuf::new(&mut host_out),
    };
    exec2d::<HostParallel, _>(nx, ny, &kernel);
    drop(kernel);

    let mut device_out = vec![0.0f32; nx * ny];
    let kernel = CopyKernel {
        nx,
        f: &f,
        fn_out: KernelBuf::new(&mut device_out),
    };
    exec2d::<DeviceGpu, _>(nx, ny, &kernel);
    drop(kernel);

    assert_eq!(host_out, device_out);
    assert_eq!(f, device_out);
}

#[test]
fn device_visits_partial_groups_exactly_once() {
    if !adapter_or_skip() {
        return;
    }

    // 17x17 does not tile into 16x16 groups; the bounds check in the
    // kernel body must retire the 2x2 grid's out-of-range threads.
    let nx = 17;
    let ny = 17;
    let mut visits = vec![0.0f32; nx * ny];

    let kernel = VisitKernel {
        nx,
        visits: KernelBuf::new(&mut visits),
    };
    exec2d::<DeviceGpu, _>(nx, ny, &kernel);
    drop(kernel);

    assert!(visits.iter().all(|&v| v == 1.0));
}

#[test]
fn device_dispatch_is_synchronous() {
    if !adapter_or_skip() {
        return;
    }

    let nx = 64;
    let ny = 48;
    let f: Vec<f32> = (0..nx * ny).map(|ij| (ij % 251) as f32).collect();
    let mut fn_out = vec![0.0f32; nx * ny];

    let kernel = CopyKernel {
        nx,
        f: &f,
        fn_out: KernelBuf::new(&mut fn_out),
    };
    exec2d::<DeviceGpu, _>(nx, ny, &kernel);
    drop(kernel);

    // No completion handle exists; everything must already be here.
    assert_eq!(f, fn_out);
}

#[test]
fn device_empty_domain_invokes_nothing() {
    if !adapter_or_skip() {
        return;
    }

    let nx = 8;
    let mut visits = vec![0.0f32; nx * 8];

    let kernel = VisitKernel {
        nx,
        visits: KernelBuf::new(&mut visits),
    };
    exec2d::<DeviceGpu, _>(0, 8, &kernel);
    exec2d::<DeviceGpu, _>(8, 0, &kernel);
    drop(kernel);

    assert!(visits.iter().all(|&v| v == 0.0));
}
