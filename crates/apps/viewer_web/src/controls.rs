use std::cell::RefCell;
use std::rc::Rc;

use foundation::math::Vec3;
use scene::CameraPose;
use viewer::OrbitControls;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

const ORBIT_SPEED: f64 = 0.005;
const PITCH_LIMIT: f64 = 1.55;
const MIN_DISTANCE: f64 = 0.25;
const MAX_DISTANCE: f64 = 5000.0;

/// Spherical camera placement around a fixed target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitState {
    pub yaw_rad: f64,
    pub pitch_rad: f64,
    pub distance: f64,
    pub target: Vec3,
}

impl OrbitState {
    /// Orbit state reproducing a camera at `position` looking at `target`.
    pub fn from_pose(pose: CameraPose) -> Self {
        let offset = pose.position - pose.target;
        let distance = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let pitch_rad = if offset.length() > 0.0 {
            (offset.y / offset.length()).clamp(-1.0, 1.0).asin()
        } else {
            0.0
        };
        Self {
            yaw_rad: offset.z.atan2(offset.x),
            pitch_rad: pitch_rad.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance,
            target: pose.target,
        }
    }

    /// Rotates by a pointer delta in CSS pixels.
    pub fn orbit(&mut self, delta_x_px: f64, delta_y_px: f64) {
        self.yaw_rad += delta_x_px * ORBIT_SPEED;
        self.pitch_rad =
            (self.pitch_rad + delta_y_px * ORBIT_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Dollies by a wheel `deltaY`.
    pub fn zoom(&mut self, wheel_delta_y: f64) {
        let factor = (wheel_delta_y * 0.0015).exp();
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn pose(&self) -> CameraPose {
        let dir = Vec3::new(
            self.pitch_rad.cos() * self.yaw_rad.cos(),
            self.pitch_rad.sin(),
            self.pitch_rad.cos() * self.yaw_rad.sin(),
        );
        CameraPose::new(self.target + dir * self.distance, self.target)
    }
}

type Listeners = Rc<RefCell<Vec<Box<dyn FnMut(CameraPose)>>>>;

struct DragState {
    orbit: OrbitState,
    last_pointer: Option<(f64, f64)>,
}

/// Pointer-driven orbit controls bound to one canvas.
pub struct PointerOrbitControls {
    listeners: Listeners,
}

impl PointerOrbitControls {
    pub fn attach(
        canvas: &web_sys::HtmlCanvasElement,
        initial: CameraPose,
    ) -> Result<Self, JsValue> {
        let listeners: Listeners = Rc::new(RefCell::new(Vec::new()));
        let drag = Rc::new(RefCell::new(DragState {
            orbit: OrbitState::from_pose(initial),
            last_pointer: None,
        }));

        {
            let drag = drag.clone();
            let target = canvas.clone();
            let closure = Closure::wrap(Box::new(move |e: web_sys::PointerEvent| {
                // Keep receiving moves when the pointer leaves the canvas mid-drag.
                let _ = target.set_pointer_capture(e.pointer_id());
                let pointer = (e.client_x() as f64, e.client_y() as f64);
                drag.borrow_mut().last_pointer = Some(pointer);
            }) as Box<dyn FnMut(_)>);
            canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let drag = drag.clone();
            let listeners = listeners.clone();
            let closure = Closure::wrap(Box::new(move |e: web_sys::PointerEvent| {
                let pose = {
                    let Ok(mut st) = drag.try_borrow_mut() else {
                        return;
                    };
                    let Some((x0, y0)) = st.last_pointer else {
                        return;
                    };
                    let (x, y) = (e.client_x() as f64, e.client_y() as f64);
                    st.last_pointer = Some((x, y));
                    st.orbit.orbit(x - x0, y - y0);
                    st.orbit.pose()
                };
                notify(&listeners, pose);
            }) as Box<dyn FnMut(_)>);
            canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        for event in ["pointerup", "pointercancel"] {
            let drag = drag.clone();
            let closure = Closure::wrap(Box::new(move |_e: web_sys::PointerEvent| {
                drag.borrow_mut().last_pointer = None;
            }) as Box<dyn FnMut(_)>);
            canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let drag = drag.clone();
            let listeners = listeners.clone();
            let closure = Closure::wrap(Box::new(move |e: web_sys::WheelEvent| {
                e.prevent_default();
                let pose = {
                    let Ok(mut st) = drag.try_borrow_mut() else {
                        return;
                    };
                    st.orbit.zoom(e.delta_y());
                    st.orbit.pose()
                };
                notify(&listeners, pose);
            }) as Box<dyn FnMut(_)>);
            canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(Self { listeners })
    }
}

fn notify(listeners: &Listeners, pose: CameraPose) {
    let Ok(mut listeners) = listeners.try_borrow_mut() else {
        return;
    };
    for listener in listeners.iter_mut() {
        listener(pose);
    }
}

impl OrbitControls for PointerOrbitControls {
    fn on_change(&mut self, listener: Box<dyn FnMut(CameraPose)>) {
        self.listeners.borrow_mut().push(listener);
    }
}
