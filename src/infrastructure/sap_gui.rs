//! SAP GUI Scripting 绑定（Windows COM）
//!
//! 相当于脚本里的 `GetObject("SAPGUI").GetScriptingEngine.Children(0).Children(0)`，
//! 所有控件操作都经由 `IDispatch` 按名称调用。

use std::ptr::{self, NonNull};

use tracing::{debug, info, warn};
use winapi::ctypes::c_void;
use winapi::shared::guiddef::IID_NULL;
use winapi::shared::minwindef::{UINT, ULONG, WORD};
use winapi::shared::ntdef::HRESULT;
use winapi::shared::winerror::{DISP_E_EXCEPTION, FAILED, RPC_E_CHANGED_MODE};
use winapi::shared::wtypes::{VARTYPE, VT_BOOL, VT_BSTR, VT_DISPATCH, VT_EMPTY, VT_I4};
use winapi::um::combaseapi::{CoInitializeEx, CoUninitialize};
use winapi::um::oaidl::{IDispatch, DISPID, DISPID_PROPERTYPUT, DISPPARAMS, EXCEPINFO, VARIANT};
use winapi::um::objbase::{CreateBindCtx, MkParseDisplayName, COINIT_APARTMENTTHREADED};
use winapi::um::objidl::{IBindCtx, IMoniker};
use winapi::um::oleauto::{
    SysAllocStringLen, SysFreeString, SysStringLen, VariantClear, VariantInit, DISPATCH_METHOD,
    DISPATCH_PROPERTYGET, DISPATCH_PROPERTYPUT,
};
use winapi::um::winnt::LOCALE_USER_DEFAULT;
use winapi::Interface;

use crate::error::{ConnectError, StepError};
use crate::infrastructure::gui_session::{GuiSession, VKey};
use crate::infrastructure::session_locator::{SessionHandle, SessionLocator};

/// COM 调用失败的原始信息
#[derive(Debug)]
struct ComFailure {
    hresult: u32,
    message: String,
}

impl ComFailure {
    fn from_hresult(hr: HRESULT, context: &str) -> Self {
        Self {
            hresult: hr as u32,
            message: format!("{} (HRESULT 0x{:08X})", context, hr as u32),
        }
    }

    fn into_step_error(self, control: &str, action: &'static str) -> StepError {
        StepError::new(control, action, self.message)
    }
}

impl From<ComFailure> for ConnectError {
    fn from(failure: ComFailure) -> Self {
        ConnectError::Com {
            hresult: failure.hresult,
            message: failure.message,
        }
    }
}

fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// 拥有所有权的 VARIANT，析构时调用 `VariantClear`
#[repr(transparent)]
struct Variant(VARIANT);

impl Variant {
    fn empty() -> Self {
        unsafe {
            let mut raw: VARIANT = std::mem::zeroed();
            VariantInit(&mut raw);
            Variant(raw)
        }
    }

    fn text(value: &str) -> Self {
        let wide: Vec<u16> = value.encode_utf16().collect();
        let mut variant = Self::empty();
        unsafe {
            let bstr = SysAllocStringLen(wide.as_ptr(), wide.len() as UINT);
            let inner = variant.0.n1.n2_mut();
            inner.vt = VT_BSTR as VARTYPE;
            *inner.n3.bstrVal_mut() = bstr;
        }
        variant
    }

    fn int(value: i32) -> Self {
        let mut variant = Self::empty();
        unsafe {
            let inner = variant.0.n1.n2_mut();
            inner.vt = VT_I4 as VARTYPE;
            *inner.n3.lVal_mut() = value;
        }
        variant
    }

    fn vt(&self) -> VARTYPE {
        unsafe { self.0.n1.n2().vt }
    }

    /// 取出其中的 IDispatch，类型不对时返回 None
    fn into_dispatch(mut self) -> Option<Dispatch> {
        if self.vt() != VT_DISPATCH as VARTYPE {
            return None;
        }
        unsafe {
            let inner = self.0.n1.n2_mut();
            let raw = *inner.n3.pdispVal();
            // 引用计数转交给 Dispatch，VariantClear 不再释放
            inner.vt = VT_EMPTY as VARTYPE;
            NonNull::new(raw).map(Dispatch)
        }
    }

    fn to_text(&self) -> Option<String> {
        if self.vt() != VT_BSTR as VARTYPE {
            return None;
        }
        unsafe {
            let bstr = *self.0.n1.n2().n3.bstrVal();
            if bstr.is_null() {
                return Some(String::new());
            }
            let len = SysStringLen(bstr) as usize;
            Some(String::from_utf16_lossy(std::slice::from_raw_parts(bstr, len)))
        }
    }

    fn to_bool(&self) -> Option<bool> {
        if self.vt() != VT_BOOL as VARTYPE {
            return None;
        }
        unsafe { Some(*self.0.n1.n2().n3.boolVal() != 0) }
    }
}

impl Drop for Variant {
    fn drop(&mut self) {
        unsafe {
            VariantClear(&mut self.0);
        }
    }
}

/// 取脚本引擎是方法，不是属性
const GET_SCRIPTING_ENGINE: &str = "GetScriptingEngine";

/// IDispatch 成员的调用方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Get,
    Put,
    /// 方法调用，兼容把无参方法暴露成属性的对象
    Call,
}

impl Access {
    fn flags(self) -> WORD {
        match self {
            Access::Get => DISPATCH_PROPERTYGET,
            Access::Put => DISPATCH_PROPERTYPUT,
            Access::Call => DISPATCH_METHOD | DISPATCH_PROPERTYGET,
        }
    }
}

/// 拥有一个引用计数的 IDispatch 指针
struct Dispatch(NonNull<IDispatch>);

impl Dispatch {
    fn get(&self, name: &str) -> Result<Variant, ComFailure> {
        self.invoke(name, Access::Get, Vec::new())
    }

    fn put(&self, name: &str, value: Variant) -> Result<(), ComFailure> {
        self.invoke(name, Access::Put, vec![value]).map(drop)
    }

    fn call(&self, name: &str, args: Vec<Variant>) -> Result<Variant, ComFailure> {
        self.invoke(name, Access::Call, args)
    }

    fn invoke(&self, name: &str, access: Access, mut args: Vec<Variant>) -> Result<Variant, ComFailure> {
        let raw = self.0.as_ptr();
        let mut wide_name = to_wide(name);
        let mut names = [wide_name.as_mut_ptr()];
        let mut dispid: DISPID = 0;

        unsafe {
            let hr = (*raw).GetIDsOfNames(
                &IID_NULL,
                names.as_mut_ptr(),
                1,
                LOCALE_USER_DEFAULT,
                &mut dispid,
            );
            if FAILED(hr) {
                return Err(ComFailure::from_hresult(hr, &format!("未知成员 {}", name)));
            }

            // IDispatch 的参数按逆序传递
            args.reverse();
            let mut named_put: DISPID = DISPID_PROPERTYPUT;
            let is_put = access == Access::Put;
            let mut params = DISPPARAMS {
                rgvarg: args.as_mut_ptr() as *mut VARIANT,
                rgdispidNamedArgs: if is_put { &mut named_put } else { ptr::null_mut() },
                cArgs: args.len() as UINT,
                cNamedArgs: if is_put { 1 } else { 0 },
            };

            let mut result = Variant::empty();
            let mut excep: EXCEPINFO = std::mem::zeroed();
            let mut arg_err: UINT = 0;
            let hr = (*raw).Invoke(
                dispid,
                &IID_NULL,
                LOCALE_USER_DEFAULT,
                access.flags(),
                &mut params,
                &mut result.0,
                &mut excep,
                &mut arg_err,
            );

            if FAILED(hr) {
                let mut failure = ComFailure::from_hresult(hr, name);
                if hr == DISP_E_EXCEPTION && !excep.bstrDescription.is_null() {
                    let len = SysStringLen(excep.bstrDescription) as usize;
                    failure.message = String::from_utf16_lossy(std::slice::from_raw_parts(
                        excep.bstrDescription,
                        len,
                    ));
                }
                SysFreeString(excep.bstrSource);
                SysFreeString(excep.bstrDescription);
                SysFreeString(excep.bstrHelpFile);
                return Err(failure);
            }

            Ok(result)
        }
    }
}

impl Drop for Dispatch {
    fn drop(&mut self) {
        unsafe {
            (*self.0.as_ptr()).Release();
        }
    }
}

/// 在运行对象表中按显示名查找对象（VB 的 `GetObject(name)`）
fn get_object(name: &str) -> Result<Dispatch, ComFailure> {
    let wide_name = to_wide(name);
    unsafe {
        let mut ctx: *mut IBindCtx = ptr::null_mut();
        let hr = CreateBindCtx(0, &mut ctx);
        if FAILED(hr) {
            return Err(ComFailure::from_hresult(hr, "CreateBindCtx"));
        }

        let mut eaten: ULONG = 0;
        let mut moniker: *mut IMoniker = ptr::null_mut();
        let hr = MkParseDisplayName(ctx, wide_name.as_ptr(), &mut eaten, &mut moniker);
        if FAILED(hr) {
            (*ctx).Release();
            return Err(ComFailure::from_hresult(hr, &format!("找不到 {}", name)));
        }

        let mut object: *mut c_void = ptr::null_mut();
        let hr = (*moniker).BindToObject(ctx, ptr::null_mut(), &IDispatch::uuidof(), &mut object);
        (*moniker).Release();
        (*ctx).Release();
        if FAILED(hr) {
            return Err(ComFailure::from_hresult(hr, &format!("无法绑定 {}", name)));
        }

        NonNull::new(object as *mut IDispatch)
            .map(Dispatch)
            .ok_or_else(|| ComFailure::from_hresult(hr, "BindToObject 返回空指针"))
    }
}

/// 当前线程的 COM 单线程套间
struct ComApartment {
    owns_init: bool,
}

impl ComApartment {
    fn enter() -> Result<Self, ComFailure> {
        let hr = unsafe { CoInitializeEx(ptr::null_mut(), COINIT_APARTMENTTHREADED) };
        if hr == RPC_E_CHANGED_MODE {
            // 线程已经以其他模式初始化过，沿用即可
            warn!("COM 已在当前线程以其他模式初始化");
            return Ok(Self { owns_init: false });
        }
        if FAILED(hr) {
            return Err(ComFailure::from_hresult(hr, "CoInitializeEx"));
        }
        Ok(Self { owns_init: true })
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        if self.owns_init {
            unsafe { CoUninitialize() };
        }
    }
}

/// 已绑定的 SAP GUI 会话
pub struct SapGuiSession {
    session: Dispatch,
    _connection: Dispatch,
}

impl SapGuiSession {
    fn find(&self, id: &str) -> Result<Dispatch, StepError> {
        self.session
            .call("findById", vec![Variant::text(id)])
            .map_err(|e| e.into_step_error(id, "findById"))?
            .into_dispatch()
            .ok_or_else(|| StepError::new(id, "findById", "控件不存在"))
    }
}

impl GuiSession for SapGuiSession {
    fn set_text(&self, id: &str, text: &str) -> Result<(), StepError> {
        self.find(id)?
            .put("Text", Variant::text(text))
            .map_err(|e| e.into_step_error(id, "Text"))
    }

    fn get_text(&self, id: &str) -> Result<String, StepError> {
        let value = self
            .find(id)?
            .get("Text")
            .map_err(|e| e.into_step_error(id, "Text"))?;
        value
            .to_text()
            .ok_or_else(|| StepError::new(id, "Text", "返回值不是文本"))
    }

    fn send_vkey(&self, id: &str, key: VKey) -> Result<(), StepError> {
        self.find(id)?
            .call("sendVKey", vec![Variant::int(key.code())])
            .map(drop)
            .map_err(|e| e.into_step_error(id, "sendVKey"))
    }

    fn press(&self, id: &str) -> Result<(), StepError> {
        self.find(id)?
            .call("press", Vec::new())
            .map(drop)
            .map_err(|e| e.into_step_error(id, "press"))
    }

    fn select(&self, id: &str) -> Result<(), StepError> {
        self.find(id)?
            .call("select", Vec::new())
            .map(drop)
            .map_err(|e| e.into_step_error(id, "select"))
    }

    fn set_current_cell_column(&self, id: &str, column: &str) -> Result<(), StepError> {
        self.find(id)?
            .put("currentCellColumn", Variant::text(column))
            .map_err(|e| e.into_step_error(id, "currentCellColumn"))
    }

    fn select_rows(&self, id: &str, rows: &str) -> Result<(), StepError> {
        self.find(id)?
            .put("selectedRows", Variant::text(rows))
            .map_err(|e| e.into_step_error(id, "selectedRows"))
    }

    fn set_selection_indexes(&self, id: &str, start: usize, end: usize) -> Result<(), StepError> {
        let to_i32 = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
        self.find(id)?
            .call(
                "setSelectionIndexes",
                vec![Variant::int(to_i32(start)), Variant::int(to_i32(end))],
            )
            .map(drop)
            .map_err(|e| e.into_step_error(id, "setSelectionIndexes"))
    }

    fn is_busy(&self) -> Result<bool, StepError> {
        let value = self
            .session
            .get("Busy")
            .map_err(|e| e.into_step_error("session", "Busy"))?;
        Ok(value.to_bool().unwrap_or(false))
    }
}

/// 通过运行对象表定位 SAP GUI
pub struct SapGuiLocator {
    host_name: String,
    apartment: Option<ComApartment>,
}

impl SapGuiLocator {
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
            apartment: None,
        }
    }

    fn first_child(parent: &Dispatch) -> Result<Option<Dispatch>, ComFailure> {
        let children = parent
            .get("Children")?
            .into_dispatch()
            .ok_or_else(|| ComFailure::from_hresult(0, "Children 不是集合"))?;
        Ok(children.call("ElementAt", vec![Variant::int(0)])?.into_dispatch())
    }
}

impl SessionLocator for SapGuiLocator {
    type Session = SapGuiSession;

    fn connect(&mut self) -> Result<SessionHandle<SapGuiSession>, ConnectError> {
        if self.apartment.is_none() {
            self.apartment = Some(ComApartment::enter()?);
        }

        info!("正在连接 SAP GUI: {}", self.host_name);
        let host = get_object(&self.host_name).map_err(|e| ConnectError::HostUnavailable {
            name: self.host_name.clone(),
            message: e.message,
        })?;

        let engine = host
            .call(GET_SCRIPTING_ENGINE, Vec::new())?
            .into_dispatch()
            .ok_or_else(|| ConnectError::NotScriptingEngine {
                name: self.host_name.clone(),
            })?;

        let connection = Self::first_child(&engine)
            .map_err(|e| ConnectError::NoConnection { message: e.message })?
            .ok_or_else(|| ConnectError::NoConnection {
                message: "Children(0) 为空".to_string(),
            })?;

        let session = Self::first_child(&connection)
            .map_err(|e| ConnectError::NoSession { message: e.message })?
            .ok_or_else(|| ConnectError::NoSession {
                message: "Children(0) 为空".to_string(),
            })?;

        debug!("已绑定 SAP GUI 会话");
        Ok(SessionHandle::bound(SapGuiSession {
            session,
            _connection: connection,
        }))
    }

    fn disconnect(&mut self, handle: &mut SessionHandle<SapGuiSession>) {
        if handle.release().is_some() {
            info!("已断开 SAP GUI 会话");
        }
    }
}
