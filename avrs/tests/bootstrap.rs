//! The RAM-initializing steps, run against ordinary host memory.

use std::cell::Cell;
use std::ptr;

use avrs::boot::{clear_uninitialized, copy_initialized_data, DataSpace, Image,
                 ProgramMemory};
use proptest::prelude::*;

/// Program memory that counts reads and refuses to go past its image.
struct Rom<'a> {
    image: &'a [u8],
    reads: Cell<usize>,
}

impl<'a> ProgramMemory for Rom<'a> {
    unsafe fn load(&self, addr: *const u8) -> u8 {
        let offset = addr as usize - self.image.as_ptr() as usize;
        self.reads.set(self.reads.get() + 1);
        self.image[offset]
    }
}

proptest! {
    #[test]
    fn copy_reproduces_the_load_image(load in prop::collection::vec(any::<u8>(), 0..64),
                                      fill in any::<u8>()) {
        let rom = Rom { image: &load, reads: Cell::new(0) };
        let mut ram = vec![fill; load.len() + 2];
        unsafe {
            let p = ram.as_mut_ptr().add(1);
            copy_initialized_data(&rom, load.as_ptr(), p, p.add(load.len()));
        }
        prop_assert_eq!(rom.reads.get(), load.len());
        prop_assert_eq!(&ram[1..=load.len()], &load[..]);
        prop_assert_eq!(ram[0], fill);
        prop_assert_eq!(ram[load.len() + 1], fill);
    }

    #[test]
    fn clear_zeroes_exactly_the_region(len in 0usize..64, fill in 1u8..) {
        let mut ram = vec![fill; len + 2];
        unsafe {
            let p = ram.as_mut_ptr().add(1);
            clear_uninitialized(p, p.add(len));
        }
        prop_assert!(ram[1..=len].iter().all(|&b| b == 0));
        prop_assert_eq!(ram[0], fill);
        prop_assert_eq!(ram[len + 1], fill);
    }

    #[test]
    fn init_sets_up_data_then_bss(load in prop::collection::vec(any::<u8>(), 0..32),
                                  bss_len in 0usize..32) {
        let data_len = load.len();
        let mut ram = vec![0xa5u8; data_len + bss_len];
        let image = unsafe {
            let p = ram.as_mut_ptr();
            Image {
                memory: DataSpace,
                data_load: load.as_ptr(),
                data: p,
                data_end: p.add(data_len),
                bss: p.add(data_len),
                bss_end: p.add(data_len + bss_len),
            }
        };
        unsafe { image.init() }
        prop_assert_eq!(&ram[..data_len], &load[..]);
        prop_assert!(ram[data_len..].iter().all(|&b| b == 0));
    }
}

#[test]
fn three_bytes_of_data_and_four_of_bss() {
    let load = [0x01u8, 0x02, 0x03];
    let mut data = [0u8; 3];
    let mut bss = [0xffu8; 4];
    unsafe {
        let d = data.as_mut_ptr_range();
        let b = bss.as_mut_ptr_range();
        let image = Image {
            memory: DataSpace,
            data_load: load.as_ptr(),
            data: d.start,
            data_end: d.end,
            bss: b.start,
            bss_end: b.end,
        };
        image.init();
    }
    assert_eq!(data, [0x01, 0x02, 0x03]);
    assert_eq!(bss, [0; 4]);
}

#[test]
fn empty_image_touches_nothing() {
    let rom = Rom { image: &[], reads: Cell::new(0) };
    let mut ram = [0x5au8; 4];
    unsafe {
        let p = ram.as_mut_ptr().add(2);
        let image = Image {
            memory: rom,
            data_load: ptr::null(),
            data: p,
            data_end: p,
            bss: p,
            bss_end: p,
        };
        image.init();
        assert_eq!(image.memory.reads.get(), 0);
    }
    assert_eq!(ram, [0x5a; 4]);
}
