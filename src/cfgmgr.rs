///// Otter: Lebender Windows-Backend (SetupAPI + CfgMgr32) hinter dem DeviceTree-Trait.
///// Schneefuchs: Direktes FFI, keine winapi/windows-Crates; Info-Set via RAII-Guard freigegeben.
///// Maus: CR_NO_SUCH_DEVNODE heisst Wurzel, alle anderen CR_* sind Lookup-Fehler; UTF-16 lossy rein.
///// Datei: src/cfgmgr.rs
#![cfg(windows)]

use std::ffi::c_void;
use std::os::windows::ffi::OsStrExt;

use crate::devtree::{DevNode, DeviceTree, TreeError};
use crate::term::out_warn;

type HDEVINFO = *mut c_void;
type DEVINST = u32;
type CONFIGRET = u32;
type BOOL = i32;
type DWORD = u32;

const CR_SUCCESS: CONFIGRET = 0x00;
const CR_NO_SUCH_DEVNODE: CONFIGRET = 0x0D;

const DIGCF_PRESENT: DWORD = 0x02;
const DIGCF_ALLCLASSES: DWORD = 0x04;

const ERROR_NO_MORE_ITEMS: DWORD = 259;

// cfgmgr32.h: MAX_DEVICE_ID_LEN (Zeichen, ohne Nul).
const MAX_DEVICE_ID_LEN: usize = 200;

const INVALID_HANDLE_VALUE: HDEVINFO = -1isize as HDEVINFO;

#[repr(C)]
struct Guid {
    data1: u32,
    data2: u16,
    data3: u16,
    data4: [u8; 8],
}

#[repr(C)]
struct SpDevinfoData {
    cb_size: DWORD,
    class_guid: Guid,
    dev_inst: DEVINST,
    reserved: usize,
}

#[link(name = "setupapi")]
extern "system" {
    fn SetupDiGetClassDevsW(
        class_guid: *const Guid,
        enumerator: *const u16,
        hwnd_parent: *mut c_void,
        flags: DWORD,
    ) -> HDEVINFO;
    fn SetupDiEnumDeviceInfo(
        device_info_set: HDEVINFO,
        member_index: DWORD,
        device_info_data: *mut SpDevinfoData,
    ) -> BOOL;
    fn SetupDiGetDeviceInstanceIdW(
        device_info_set: HDEVINFO,
        device_info_data: *mut SpDevinfoData,
        device_instance_id: *mut u16,
        device_instance_id_size: DWORD,
        required_size: *mut DWORD,
    ) -> BOOL;
    fn SetupDiDestroyDeviceInfoList(device_info_set: HDEVINFO) -> BOOL;
}

#[link(name = "cfgmgr32")]
extern "system" {
    fn CM_Get_Parent(parent: *mut DEVINST, dev_inst: DEVINST, flags: u32) -> CONFIGRET;
    fn CM_Get_Device_IDW(dev_inst: DEVINST, buffer: *mut u16, buffer_len: u32, flags: u32) -> CONFIGRET;
}

#[link(name = "kernel32")]
extern "system" {
    fn GetLastError() -> DWORD;
}

fn to_wide(s: &str) -> Vec<u16> {
    std::ffi::OsStr::new(s).encode_wide().chain(std::iter::once(0)).collect()
}

fn from_wide_buf(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}

/// RAII-Guard fuer das Device-Info-Set; Freigabe auf jedem Pfad,
/// auch bei fruehem Return.
struct DevInfoSet(HDEVINFO);

impl DevInfoSet {
    fn open(enumerator: &str) -> Result<Self, TreeError> {
        let filter = to_wide(enumerator);
        let h = unsafe {
            SetupDiGetClassDevsW(
                std::ptr::null(),
                filter.as_ptr(),
                std::ptr::null_mut(),
                DIGCF_PRESENT | DIGCF_ALLCLASSES,
            )
        };
        if h == INVALID_HANDLE_VALUE || h.is_null() {
            return Err(TreeError::SetUnavailable);
        }
        Ok(DevInfoSet(h))
    }
}

impl Drop for DevInfoSet {
    fn drop(&mut self) {
        unsafe {
            SetupDiDestroyDeviceInfoList(self.0);
        }
    }
}

/// Der echte Geraetebaum des laufenden Systems.
pub struct LiveDeviceTree;

impl DeviceTree for LiveDeviceTree {
    fn devices(&self, filter: &str) -> Result<Vec<(String, DevNode)>, TreeError> {
        let set = DevInfoSet::open(filter)?;

        let mut out = Vec::new();
        let mut index: DWORD = 0;
        loop {
            let mut data = SpDevinfoData {
                cb_size: std::mem::size_of::<SpDevinfoData>() as DWORD,
                class_guid: Guid { data1: 0, data2: 0, data3: 0, data4: [0; 8] },
                dev_inst: 0,
                reserved: 0,
            };
            let ok = unsafe { SetupDiEnumDeviceInfo(set.0, index, &mut data) };
            if ok == 0 {
                let err = unsafe { GetLastError() };
                if err != ERROR_NO_MORE_ITEMS {
                    out_warn("CFGMGR", &format!("enumeration stopped early (error {})", err));
                }
                break;
            }

            let mut buf = [0u16; MAX_DEVICE_ID_LEN + 1];
            let got = unsafe {
                SetupDiGetDeviceInstanceIdW(
                    set.0,
                    &mut data,
                    buf.as_mut_ptr(),
                    buf.len() as DWORD,
                    std::ptr::null_mut(),
                )
            };
            if got != 0 {
                out.push((from_wide_buf(&buf), DevNode(data.dev_inst)));
            } else {
                // Eintrag ohne lesbare ID kann nie der Gesuchte sein.
                out_warn("CFGMGR", &format!("skipping device #{} without readable id", index));
            }

            index += 1;
        }
        // `set` wird hier zerstoert; DEVINST-Handles bleiben davon unberuehrt gueltig.
        Ok(out)
    }

    fn parent(&self, node: DevNode) -> Result<Option<DevNode>, TreeError> {
        let mut parent: DEVINST = 0;
        let ret = unsafe { CM_Get_Parent(&mut parent, node.0, 0) };
        match ret {
            CR_SUCCESS => Ok(Some(DevNode(parent))),
            CR_NO_SUCH_DEVNODE => Ok(None),
            other => Err(TreeError::NodeLookup(format!("CM_Get_Parent returned CR 0x{:02X}", other))),
        }
    }

    fn instance_id(&self, node: DevNode) -> Result<String, TreeError> {
        let mut buf = [0u16; MAX_DEVICE_ID_LEN + 1];
        let ret = unsafe { CM_Get_Device_IDW(node.0, buf.as_mut_ptr(), buf.len() as u32, 0) };
        if ret == CR_SUCCESS {
            Ok(from_wide_buf(&buf))
        } else {
            Err(TreeError::NodeLookup(format!("CM_Get_Device_ID returned CR 0x{:02X}", ret)))
        }
    }
}
