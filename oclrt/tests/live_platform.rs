//! 真驱动上的冒烟测试。
//!
//! 没装 OpenCL 时 [`Platform::all`] 给空集,循环空转,测试自然通过;
//! 装了驱动则在每个设备上各跑一遍。

use oclrt::{wait_for_events, DeviceType, MemFlags, Platform, QueueProperties, WaitList};
use std::{thread, time::Duration};

#[test]
fn test_enumerate() {
    for platform in Platform::all().unwrap() {
        println!(
            "{} | {} | {}",
            platform.name(),
            platform.vendor(),
            platform.version(),
        );
        for device in platform.devices(DeviceType::ALL).unwrap() {
            println!(
                "- {} | {:?} | {} CU | max group {} | global {} MiB | local {} KiB",
                device.name(),
                device.device_type(),
                device.max_compute_units(),
                device.max_group_size(),
                device.global_mem_size() >> 20,
                device.local_mem_size() >> 10,
            );
        }
    }
}

#[test]
fn test_scale_kernel() {
    const SRC: &str = r#"
kernel void scale(global float* data, float k, uint n) {
    uint i = get_global_id(0);
    if (i < n) data[i] *= k;
}
"#;
    const N: usize = 1024;

    for platform in Platform::all().unwrap() {
        for device in platform.devices(DeviceType::ALL).unwrap() {
            println!("scale on {}", device.name());

            let context = device.context().unwrap();
            let queue = context
                .create_queue(&device, QueueProperties::empty())
                .unwrap();
            let program = match context.build_from_source(SRC, "") {
                Ok(program) => program,
                Err(e) => panic!("{e}"),
            };
            let mut kernel = program.create_kernel("scale").unwrap();
            println!(
                "- {}: {} args, preferred multiple {}",
                kernel.name(),
                kernel.num_args().unwrap(),
                kernel.preferred_work_group_size_multiple(&device).unwrap(),
            );

            let data: Vec<f32> = (0..N).map(|i| i as f32).collect();
            let buf = context
                .create_buffer_from(MemFlags::READ_WRITE, &data)
                .unwrap();

            kernel
                .set_arg(0, &buf)
                .unwrap()
                .set_arg(1, 2.5f32)
                .unwrap()
                .set_arg(2, N as u32)
                .unwrap();
            let done = queue
                .enqueue_kernel(&kernel, None, &[N], None, &WaitList::new())
                .unwrap();
            done.wait().unwrap();
            assert_eq!(done.status().unwrap(), 0);

            let mut out = vec![0.0f32; N];
            queue
                .read_buffer_into(&buf, 0, &mut out, &WaitList::new())
                .unwrap();
            queue.finish().unwrap();

            for (i, (x, y)) in data.iter().zip(&out).enumerate() {
                assert_eq!(x * 2.5, *y, "mismatch at {i}");
            }
        }
    }
}

#[test]
fn test_user_event() {
    for platform in Platform::all().unwrap() {
        for device in platform.devices(DeviceType::ALL).unwrap() {
            let context = device.context().unwrap();
            let event = context.create_user_event().unwrap();
            thread::scope(|s| {
                s.spawn(|| {
                    thread::sleep(Duration::from_millis(50));
                    event.complete().unwrap();
                });
                wait_for_events(&WaitList::from([&event])).unwrap();
            });
            assert_eq!(event.status().unwrap(), 0);
        }
    }
}
