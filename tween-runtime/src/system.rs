//! # System 模块
//!
//! 补间系统管理器。
//!
//! 对象实现 `Animatable` trait，系统每帧直接写入属性值：
//! ```rust,ignore
//! let obj_id = system.register(Rc::new(sprite));
//! system.recolor(obj_id, Rgba::RED, 1.0, EasingFunction::Linear, None)?;
//! let events = system.update(dt);
//! ```
//!
//! 同一对象在同一属性域上已有动画时，新请求按覆盖策略接管；
//! 复合动画被覆盖时先软停止，新请求排在软停止之后启动。

use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::TweenEvent;
use crate::animation::{MorphTask, TaskStatus, TweenId};
use crate::clock::TickSource;
use crate::composite::{BlinkMode, CompositeKind, CompositeTask, FlashOptions};
use crate::config::TweenConfig;
use crate::domain::{ColorDomain, PositionDomain, PropertyDomain};
use crate::easing::EasingFunction;
use crate::error::{TweenError, TweenResult};
use crate::override_policy::{OverrideDecision, OverrideRequest, resolve_override};
use crate::registry::{
    AnimationRecord, CompletionCallback, CompositeRequest, MorphRequest, PendingRequest,
    Registries, TweenTask,
};
use crate::traits::{Animatable, ObjectId};
use crate::value::{Rgba, TweenValue, Vec3};

/// 淡入淡出模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeMode {
    /// 接近不透明（alpha > 0.5）时淡出，否则淡入
    ///
    /// 取整为四舍六入五成双，alpha 恰为 0.5 时淡入。
    #[default]
    Toggle,
    /// 淡入到 alpha 1
    In,
    /// 淡出到 alpha 0
    Out,
}

impl FadeMode {
    /// 是否为淡出
    pub fn is_fade_out(self, current_alpha: f32) -> bool {
        match self {
            FadeMode::Toggle => current_alpha.round_ties_even() >= 1.0,
            FadeMode::In => false,
            FadeMode::Out => true,
        }
    }
}

/// 补间系统
///
/// 管理所有动画记录，提供统一的请求、更新和查询接口。
pub struct TweenSystem {
    /// 已注册的对象（ObjectId -> 对象）
    objects: HashMap<ObjectId, Rc<dyn Animatable>>,
    /// 颜色、位置两个属性域的记录表
    registries: Registries,
    config: TweenConfig,
    next_tween_id: u64,
    next_object_id: u64,
    /// 待处理的事件队列
    events: Vec<TweenEvent>,
}

impl Default for TweenSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TweenSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenSystem")
            .field("objects", &self.objects.len())
            .field("colors", &self.registries.colors.len())
            .field("positions", &self.registries.positions.len())
            .finish()
    }
}

/// 输出警告并返回错误
fn reject<T>(error: TweenError) -> TweenResult<T> {
    warn!(error = %error, "补间请求被拒绝");
    Err(error)
}

fn read_value<D: PropertyDomain>(
    object: &dyn Animatable,
    object_id: ObjectId,
) -> TweenResult<D::Value> {
    match D::read(object) {
        Some(value) => Ok(value),
        None => reject(TweenError::UnsupportedProperty {
            object: object_id,
            domain: D::NAME,
        }),
    }
}

fn write_value<D: PropertyDomain>(object: &dyn Animatable, object_id: ObjectId, value: D::Value) {
    if !D::write(object, value) {
        warn!(object = %object_id, domain = D::NAME, "属性写入失败");
    }
}

impl TweenSystem {
    /// 使用默认配置创建补间系统
    pub fn new() -> Self {
        Self::with_config(TweenConfig::default())
    }

    /// 使用给定配置创建补间系统
    pub fn with_config(config: TweenConfig) -> Self {
        Self {
            objects: HashMap::new(),
            registries: Registries::default(),
            config,
            next_tween_id: 1,
            next_object_id: 1,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &TweenConfig {
        &self.config
    }

    /// 按当前配置生成的复合动画默认参数
    pub fn flash_options(&self) -> FlashOptions {
        FlashOptions::from_defaults(&self.config.flash, self.config.max_loops)
    }

    /// 生成下一个任务 ID
    fn next_tween_id(&mut self) -> TweenId {
        let id = TweenId::new(self.next_tween_id);
        self.next_tween_id += 1;
        id
    }

    /// 生成下一个对象 ID
    fn next_object_id(&mut self) -> ObjectId {
        let id = ObjectId::new(self.next_object_id);
        self.next_object_id += 1;
        id
    }

    fn object(&self, object_id: ObjectId) -> TweenResult<Rc<dyn Animatable>> {
        match self.objects.get(&object_id) {
            Some(object) => Ok(Rc::clone(object)),
            None => reject(TweenError::ObjectNotRegistered(object_id)),
        }
    }

    // ========== 对象管理 ==========

    /// 注册可动画对象
    ///
    /// 系统分配唯一的 `ObjectId` 并返回，后续通过此 ID 引用对象。
    /// 同一个对象多次注册也会获得不同的 ID。
    pub fn register<T: Animatable>(&mut self, object: Rc<T>) -> ObjectId {
        let id = self.next_object_id();
        debug!(object = %id, label = object.label(), "注册对象");
        self.objects.insert(id, object as Rc<dyn Animatable>);
        id
    }

    /// 注销对象
    ///
    /// 强制停止对象的所有动画（包括排队中的请求）后移除对象。
    pub fn unregister(&mut self, object_id: ObjectId) -> bool {
        self.forced_stop_all(object_id);
        self.objects.remove(&object_id).is_some()
    }

    /// 检查对象是否已注册
    pub fn is_registered(&self, object_id: ObjectId) -> bool {
        self.objects.contains_key(&object_id)
    }

    /// 获取已注册对象数量
    pub fn registered_count(&self) -> usize {
        self.objects.len()
    }

    // ========== 补间请求 ==========

    /// 把对象移动到目标位置
    pub fn move_to(
        &mut self,
        object_id: ObjectId,
        target: Vec3,
        duration: f32,
        easing: EasingFunction,
        on_complete: Option<CompletionCallback>,
    ) -> TweenResult<TweenId> {
        let id = self.next_tween_id();
        self.request_morph::<PositionDomain>(
            object_id,
            MorphRequest {
                id,
                target,
                duration,
                easing,
                on_complete,
            },
        )
    }

    /// 把对象颜色变为目标颜色
    pub fn recolor(
        &mut self,
        object_id: ObjectId,
        target: Rgba,
        duration: f32,
        easing: EasingFunction,
        on_complete: Option<CompletionCallback>,
    ) -> TweenResult<TweenId> {
        let id = self.next_tween_id();
        self.request_morph::<ColorDomain>(
            object_id,
            MorphRequest {
                id,
                target,
                duration,
                easing,
                on_complete,
            },
        )
    }

    /// 淡入淡出：保持 RGB，把 alpha 变为 0 或 1
    pub fn fade(
        &mut self,
        object_id: ObjectId,
        mode: FadeMode,
        duration: f32,
        easing: EasingFunction,
        on_complete: Option<CompletionCallback>,
    ) -> TweenResult<TweenId> {
        let object = self.object(object_id)?;
        let current = read_value::<ColorDomain>(object.as_ref(), object_id)?;
        let alpha = if mode.is_fade_out(current.a) { 0.0 } else { 1.0 };
        self.recolor(
            object_id,
            current.with_alpha(alpha),
            duration,
            easing,
            on_complete,
        )
    }

    /// 在当前颜色与 `color` 之间往返闪烁
    pub fn flash(
        &mut self,
        object_id: ObjectId,
        color: Rgba,
        options: FlashOptions,
    ) -> TweenResult<TweenId> {
        let id = self.next_tween_id();
        self.request_composite(
            object_id,
            CompositeRequest {
                id,
                kind: CompositeKind::Flash(color),
                options,
            },
        )
    }

    /// 在不透明与透明之间往返
    pub fn blink(
        &mut self,
        object_id: ObjectId,
        mode: BlinkMode,
        options: FlashOptions,
    ) -> TweenResult<TweenId> {
        let id = self.next_tween_id();
        self.request_composite(
            object_id,
            CompositeRequest {
                id,
                kind: CompositeKind::Blink(mode),
                options,
            },
        )
    }

    fn request_morph<D: PropertyDomain>(
        &mut self,
        object_id: ObjectId,
        mut request: MorphRequest<D::Value>,
    ) -> TweenResult<TweenId> {
        let object = self.object(object_id)?;
        let current = read_value::<D>(object.as_ref(), object_id)?;
        if current == request.target {
            return reject(TweenError::SameValue {
                object: object_id,
                domain: D::NAME,
            });
        }
        request.duration = request.duration.max(0.0);

        if D::registry(&self.registries).contains(object_id) {
            self.override_morph::<D>(object_id, current, request)
        } else {
            Ok(self.start_morph::<D>(object_id, current, request))
        }
    }

    fn start_morph<D: PropertyDomain>(
        &mut self,
        object_id: ObjectId,
        current: D::Value,
        request: MorphRequest<D::Value>,
    ) -> TweenId {
        let MorphRequest {
            id,
            target,
            duration,
            easing,
            on_complete,
        } = request;

        let task = TweenTask::Morph(MorphTask::new(id, current, target, duration, easing));
        D::registry_mut(&mut self.registries).try_start(object_id, move || {
            AnimationRecord::new(task, current, target, duration, easing)
                .with_on_complete(on_complete)
        });

        debug!(object = %object_id, tween = %id, domain = D::NAME, duration, %easing, "启动补间");
        self.events.push(TweenEvent::Started(id));
        id
    }

    fn override_morph<D: PropertyDomain>(
        &mut self,
        object_id: ObjectId,
        current: D::Value,
        request: MorphRequest<D::Value>,
    ) -> TweenResult<TweenId> {
        let registry = D::registry_mut(&mut self.registries);
        let Some(record) = registry.lookup_mut(object_id) else {
            return reject(TweenError::NotAnimating {
                object: object_id,
                domain: D::NAME,
            });
        };

        let id = request.id;

        // 软停止过渡中：只保留最新的请求
        if record.has_queued() {
            if let Some(replaced) = record.set_queued(PendingRequest::Morph(request)) {
                debug!(object = %object_id, replaced = %replaced.id(), tween = %id, "替换排队中的请求");
                self.events.push(TweenEvent::Cancelled(replaced.id()));
            }
            return Ok(id);
        }

        if record.task().is_composite() {
            self.soft_stop::<D>(object_id, Some(PendingRequest::Morph(request)))?;
            debug!(object = %object_id, tween = %id, domain = D::NAME, "复合动画被覆盖，请求排在软停止之后");
            return Ok(id);
        }

        let decision = resolve_override(
            &record.active(),
            current,
            &OverrideRequest {
                target: request.target,
                duration: request.duration,
                easing: request.easing,
            },
        );

        match decision {
            OverrideDecision::Reject => reject(TweenError::IdenticalOverride {
                object: object_id,
                domain: D::NAME,
            }),
            OverrideDecision::Retarget {
                case,
                original,
                phase_duration,
            } => {
                let MorphRequest {
                    id,
                    target,
                    duration,
                    easing,
                    on_complete,
                } = request;

                record.task_mut().cancel();
                let task =
                    TweenTask::Morph(MorphTask::new(id, current, target, phase_duration, easing));
                let replacement = AnimationRecord::new(task, original, target, duration, easing)
                    .with_on_complete(on_complete);

                if let Some(old) = registry.replace(object_id, replacement) {
                    self.events.push(TweenEvent::Cancelled(old.task().id()));
                }
                self.events.push(TweenEvent::Started(id));
                debug!(
                    object = %object_id,
                    tween = %id,
                    domain = D::NAME,
                    ?case,
                    phase_duration,
                    "覆盖进行中的补间"
                );
                Ok(id)
            }
        }
    }

    fn request_composite(
        &mut self,
        object_id: ObjectId,
        request: CompositeRequest,
    ) -> TweenResult<TweenId> {
        let object = self.object(object_id)?;
        let current = read_value::<ColorDomain>(object.as_ref(), object_id)?;
        if matches!(request.kind, CompositeKind::Flash(color) if color == current) {
            return reject(TweenError::SameValue {
                object: object_id,
                domain: ColorDomain::NAME,
            });
        }

        let id = request.id;
        match self.registries.colors.lookup(object_id).map(AnimationRecord::has_queued) {
            Some(true) => {
                let replaced = self
                    .registries
                    .colors
                    .lookup_mut(object_id)
                    .and_then(|record| record.set_queued(PendingRequest::Composite(request)));
                if let Some(replaced) = replaced {
                    debug!(object = %object_id, replaced = %replaced.id(), tween = %id, "替换排队中的请求");
                    self.events.push(TweenEvent::Cancelled(replaced.id()));
                }
                Ok(id)
            }
            Some(false) => {
                self.soft_stop::<ColorDomain>(object_id, Some(PendingRequest::Composite(request)))?;
                debug!(object = %object_id, tween = %id, "颜色动画被复合动画覆盖，请求排在软停止之后");
                Ok(id)
            }
            None => {
                let options = request.options.sanitized(self.config.max_loops);
                let (go_target, back_target) = request.kind.targets(current);
                let duration = options.nominal_duration();
                let easing = options.go_easing;
                let loops = options.loops;
                let task =
                    TweenTask::Composite(CompositeTask::new(id, go_target, back_target, options));

                self.registries.colors.try_start(object_id, move || {
                    AnimationRecord::new(task, current, current, duration, easing)
                });

                debug!(object = %object_id, tween = %id, kind = ?request.kind, loops, "启动复合动画");
                self.events.push(TweenEvent::Started(id));
                Ok(id)
            }
        }
    }

    // ========== 停止控制 ==========

    /// 软停止颜色动画：在短时间内过渡到记录中的目标颜色
    pub fn soft_stop_color(&mut self, object_id: ObjectId) -> TweenResult<TweenId> {
        self.soft_stop::<ColorDomain>(object_id, None)
    }

    /// 软停止位置动画：在短时间内过渡到记录中的目标位置
    pub fn soft_stop_position(&mut self, object_id: ObjectId) -> TweenResult<TweenId> {
        self.soft_stop::<PositionDomain>(object_id, None)
    }

    /// 强制停止颜色动画，返回被取消的任务 ID
    pub fn forced_stop_color(&mut self, object_id: ObjectId) -> TweenResult<TweenId> {
        self.forced_stop::<ColorDomain>(object_id)
    }

    /// 强制停止位置动画，返回被取消的任务 ID
    pub fn forced_stop_position(&mut self, object_id: ObjectId) -> TweenResult<TweenId> {
        self.forced_stop::<PositionDomain>(object_id)
    }

    /// 强制停止对象在所有属性域上的动画，返回被取消的任务数
    pub fn forced_stop_all(&mut self, object_id: ObjectId) -> usize {
        let colors = self.remove_record::<ColorDomain>(object_id);
        let positions = self.remove_record::<PositionDomain>(object_id);
        usize::from(colors.is_some()) + usize::from(positions.is_some())
    }

    /// 取消当前任务，以线性过渡在 `soft_stop_duration` 内到达记录中的目标值
    ///
    /// 过渡记录不继承原来的完成回调。
    fn soft_stop<D: PropertyDomain>(
        &mut self,
        object_id: ObjectId,
        queued: Option<PendingRequest<D::Value>>,
    ) -> TweenResult<TweenId> {
        let object = self.object(object_id)?;
        let current = read_value::<D>(object.as_ref(), object_id)?;
        if !D::registry(&self.registries).contains(object_id) {
            return reject(TweenError::NotAnimating {
                object: object_id,
                domain: D::NAME,
            });
        }

        let id = self.next_tween_id();
        let duration = self.config.soft_stop_duration;
        let registry = D::registry_mut(&mut self.registries);
        let Some(record) = registry.lookup_mut(object_id) else {
            return reject(TweenError::NotAnimating {
                object: object_id,
                domain: D::NAME,
            });
        };

        record.task_mut().cancel();
        let original = record.original();
        let target = record.target();
        let task = TweenTask::Morph(MorphTask::new(
            id,
            current,
            target,
            duration,
            EasingFunction::Linear,
        ));
        let transition = AnimationRecord::new(task, original, target, duration, EasingFunction::Linear)
            .with_queued(queued);

        if let Some(old) = registry.replace(object_id, transition) {
            self.events.push(TweenEvent::Cancelled(old.task().id()));
            // 未随过渡保留的排队请求一并取消
            if let Some(dropped) = old.queued_id() {
                self.events.push(TweenEvent::Cancelled(dropped));
            }
        }
        self.events.push(TweenEvent::Started(id));
        debug!(object = %object_id, tween = %id, domain = D::NAME, duration, "软停止");
        Ok(id)
    }

    fn forced_stop<D: PropertyDomain>(&mut self, object_id: ObjectId) -> TweenResult<TweenId> {
        match self.remove_record::<D>(object_id) {
            Some(id) => Ok(id),
            None => reject(TweenError::NotAnimating {
                object: object_id,
                domain: D::NAME,
            }),
        }
    }

    fn remove_record<D: PropertyDomain>(&mut self, object_id: ObjectId) -> Option<TweenId> {
        let mut record = D::registry_mut(&mut self.registries).remove(object_id)?;
        record.task_mut().cancel();
        let id = record.task().id();
        debug!(object = %object_id, tween = %id, domain = D::NAME, "强制停止");
        self.events.push(TweenEvent::Cancelled(id));
        if let Some(queued) = record.take_queued() {
            self.events.push(TweenEvent::Cancelled(queued.id()));
        }
        Some(id)
    }

    // ========== 更新 ==========

    /// 更新所有动画
    ///
    /// # 返回
    /// 返回自上次更新以来产生的事件列表
    pub fn update(&mut self, dt: f32) -> Vec<TweenEvent> {
        let dt = dt.max(0.0);

        let finished_colors = self.advance_domain::<ColorDomain>(dt);
        let finished_positions = self.advance_domain::<PositionDomain>(dt);

        for (object_id, record) in finished_colors {
            if let Some(pending) = self.complete_record(object_id, record) {
                self.start_pending_color(object_id, pending);
            }
        }
        for (object_id, record) in finished_positions {
            if let Some(pending) = self.complete_record(object_id, record) {
                self.start_pending_position(object_id, pending);
            }
        }

        // 返回并清空事件队列
        std::mem::take(&mut self.events)
    }

    /// 从时间源取一帧并更新
    pub fn tick(&mut self, clock: &mut impl TickSource) -> Vec<TweenEvent> {
        let dt = clock.delta();
        self.update(dt)
    }

    /// 推进一个属性域的所有任务，返回已从记录表移除的完成记录
    fn advance_domain<D: PropertyDomain>(
        &mut self,
        dt: f32,
    ) -> Vec<(ObjectId, AnimationRecord<D::Value>)> {
        let objects = &self.objects;
        let events = &mut self.events;
        let registry = D::registry_mut(&mut self.registries);
        let mut finished = Vec::new();

        for (object_id, record) in registry.iter_mut() {
            let Some(object) = objects.get(&object_id) else {
                continue;
            };

            let done = match record.task_mut() {
                TweenTask::Morph(task) => match task.advance(dt) {
                    TaskStatus::Continue(value) => {
                        write_value::<D>(object.as_ref(), object_id, value);
                        false
                    }
                    TaskStatus::Done(value) => {
                        write_value::<D>(object.as_ref(), object_id, value);
                        true
                    }
                    TaskStatus::Idle => false,
                },
                TweenTask::Composite(task) => {
                    let Some(live) = D::read(object.as_ref()) else {
                        continue;
                    };
                    let step = task.advance(dt, live);
                    if let Some(value) = step.write {
                        write_value::<D>(object.as_ref(), object_id, value);
                    }
                    for (phase, iteration) in step.finished {
                        task.run_phase_callback(phase);
                        events.push(TweenEvent::PhaseFinished {
                            id: task.id(),
                            phase,
                            iteration,
                        });
                    }
                    step.done
                }
            };

            if done {
                finished.push(object_id);
            }
        }

        finished
            .into_iter()
            .filter_map(|object_id| registry.remove(object_id).map(|record| (object_id, record)))
            .collect()
    }

    /// 调用完成回调并发送完成事件，返回排队中的请求
    fn complete_record<V: TweenValue>(
        &mut self,
        object_id: ObjectId,
        mut record: AnimationRecord<V>,
    ) -> Option<PendingRequest<V>> {
        let id = record.task().id();
        if let Some(on_complete) = record.take_on_complete() {
            on_complete();
        }
        debug!(object = %object_id, tween = %id, "补间完成");
        self.events.push(TweenEvent::Completed(id));
        record.take_queued()
    }

    fn start_pending_color(&mut self, object_id: ObjectId, pending: PendingRequest<Rgba>) {
        let id = pending.id();
        let result = match pending {
            PendingRequest::Morph(request) => self.request_morph::<ColorDomain>(object_id, request),
            PendingRequest::Composite(request) => self.request_composite(object_id, request),
        };
        if let Err(error) = result {
            debug!(object = %object_id, tween = %id, error = %error, "排队中的请求未能启动");
            self.events.push(TweenEvent::Cancelled(id));
        }
    }

    fn start_pending_position(&mut self, object_id: ObjectId, pending: PendingRequest<Vec3>) {
        let id = pending.id();
        match pending {
            PendingRequest::Morph(request) => {
                if let Err(error) = self.request_morph::<PositionDomain>(object_id, request) {
                    debug!(object = %object_id, tween = %id, error = %error, "排队中的请求未能启动");
                    self.events.push(TweenEvent::Cancelled(id));
                }
            }
            PendingRequest::Composite(_) => {
                warn!(object = %object_id, tween = %id, "位置属性不支持复合动画，丢弃排队中的请求");
                self.events.push(TweenEvent::Cancelled(id));
            }
        }
    }

    // ========== 查询方法 ==========

    /// 对象是否正在进行颜色动画
    pub fn is_animating_color(&self, object_id: ObjectId) -> bool {
        self.registries.colors.contains(object_id)
    }

    /// 对象是否正在进行位置动画
    pub fn is_animating_position(&self, object_id: ObjectId) -> bool {
        self.registries.positions.contains(object_id)
    }

    pub fn color_record(&self, object_id: ObjectId) -> Option<&AnimationRecord<Rgba>> {
        self.registries.colors.lookup(object_id)
    }

    pub fn position_record(&self, object_id: ObjectId) -> Option<&AnimationRecord<Vec3>> {
        self.registries.positions.lookup(object_id)
    }

    /// 获取活跃动画数量（两个属性域合计）
    pub fn active_count(&self) -> usize {
        self.registries.colors.len() + self.registries.positions.len()
    }

    /// 检查是否有活跃的动画
    pub fn has_active_animations(&self) -> bool {
        self.active_count() > 0
    }

    /// 清空所有动画和事件
    ///
    /// 已注册的对象保持有效。
    pub fn clear(&mut self) {
        let colors = self.registries.colors.clear();
        let positions = self.registries.positions.clear();
        debug!(cancelled = colors.len() + positions.len(), "清空所有动画");
        self.events.clear();
    }
}
