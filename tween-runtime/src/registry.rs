//! # Registry 模块
//!
//! 每个属性域一张动画记录表，以 `ObjectId` 为键。
//!
//! 记录表是“对象是否正在该属性域上动画”的唯一依据：
//! 同一对象在同一属性域上最多只有一条记录，记录存在期间其任务是该属性唯一的写入者。

use std::collections::BTreeMap;

use crate::animation::{MorphTask, TaskState, TweenId};
use crate::composite::{CompositeKind, CompositeTask, FlashOptions};
use crate::easing::EasingFunction;
use crate::override_policy::ActiveTween;
use crate::traits::ObjectId;
use crate::value::{Rgba, TweenValue, Vec3};

/// 自然完成时调用一次的回调
pub type CompletionCallback = Box<dyn FnOnce()>;

/// 正在运行的任务
#[derive(Debug)]
pub enum TweenTask<V> {
    Morph(MorphTask<V>),
    Composite(CompositeTask<V>),
}

impl<V: TweenValue> TweenTask<V> {
    pub fn id(&self) -> TweenId {
        match self {
            TweenTask::Morph(task) => task.id(),
            TweenTask::Composite(task) => task.id(),
        }
    }

    pub fn state(&self) -> TaskState {
        match self {
            TweenTask::Morph(task) => task.state(),
            TweenTask::Composite(task) => task.state(),
        }
    }

    pub fn cancel(&mut self) {
        match self {
            TweenTask::Morph(task) => task.cancel(),
            TweenTask::Composite(task) => task.cancel(),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, TweenTask::Composite(_))
    }
}

/// 等待启动的单段请求
pub(crate) struct MorphRequest<V> {
    pub id: TweenId,
    pub target: V,
    pub duration: f32,
    pub easing: EasingFunction,
    pub on_complete: Option<CompletionCallback>,
}

/// 等待启动的复合请求
pub(crate) struct CompositeRequest {
    pub id: TweenId,
    pub kind: CompositeKind,
    pub options: FlashOptions,
}

/// 排在软停止之后的请求
pub(crate) enum PendingRequest<V> {
    Morph(MorphRequest<V>),
    Composite(CompositeRequest),
}

impl<V> PendingRequest<V> {
    pub fn id(&self) -> TweenId {
        match self {
            PendingRequest::Morph(request) => request.id,
            PendingRequest::Composite(request) => request.id,
        }
    }
}

/// 动画记录
pub struct AnimationRecord<V> {
    task: TweenTask<V>,
    original: V,
    target: V,
    duration: f32,
    easing: EasingFunction,
    on_complete: Option<CompletionCallback>,
    queued: Option<PendingRequest<V>>,
}

impl<V: std::fmt::Debug> std::fmt::Debug for AnimationRecord<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationRecord")
            .field("task", &self.task)
            .field("original", &self.original)
            .field("target", &self.target)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("on_complete", &self.on_complete.is_some())
            .field("queued", &self.queued.as_ref().map(PendingRequest::id))
            .finish()
    }
}

impl<V: TweenValue> AnimationRecord<V> {
    pub(crate) fn new(
        task: TweenTask<V>,
        original: V,
        target: V,
        duration: f32,
        easing: EasingFunction,
    ) -> Self {
        Self {
            task,
            original,
            target,
            duration: duration.max(0.0),
            easing,
            on_complete: None,
            queued: None,
        }
    }

    pub(crate) fn with_on_complete(mut self, on_complete: Option<CompletionCallback>) -> Self {
        self.on_complete = on_complete;
        self
    }

    pub(crate) fn with_queued(mut self, queued: Option<PendingRequest<V>>) -> Self {
        self.queued = queued;
        self
    }

    pub fn task(&self) -> &TweenTask<V> {
        &self.task
    }

    pub(crate) fn task_mut(&mut self) -> &mut TweenTask<V> {
        &mut self.task
    }

    pub fn original(&self) -> V {
        self.original
    }

    pub fn target(&self) -> V {
        self.target
    }

    /// 名义时长（秒）
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn easing(&self) -> EasingFunction {
        self.easing
    }

    pub fn has_on_complete(&self) -> bool {
        self.on_complete.is_some()
    }

    /// 排队中请求的 ID
    pub fn queued_id(&self) -> Option<TweenId> {
        self.queued.as_ref().map(PendingRequest::id)
    }

    pub(crate) fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    /// 替换排队中的请求，返回被替换的请求
    pub(crate) fn set_queued(&mut self, request: PendingRequest<V>) -> Option<PendingRequest<V>> {
        self.queued.replace(request)
    }

    pub(crate) fn take_on_complete(&mut self) -> Option<CompletionCallback> {
        self.on_complete.take()
    }

    pub(crate) fn take_queued(&mut self) -> Option<PendingRequest<V>> {
        self.queued.take()
    }

    /// 覆盖策略使用的参数
    pub fn active(&self) -> ActiveTween<V> {
        ActiveTween {
            original: self.original,
            target: self.target,
            duration: self.duration,
            easing: self.easing,
        }
    }
}

/// 动画记录表
#[derive(Debug)]
pub struct AnimationRegistry<V> {
    records: BTreeMap<ObjectId, AnimationRecord<V>>,
}

impl<V: TweenValue> Default for AnimationRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: TweenValue> AnimationRegistry<V> {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// 没有记录时用 `builder` 创建并插入，已有记录时返回 `None`
    pub fn try_start(
        &mut self,
        key: ObjectId,
        builder: impl FnOnce() -> AnimationRecord<V>,
    ) -> Option<&mut AnimationRecord<V>> {
        if self.records.contains_key(&key) {
            return None;
        }
        Some(self.records.entry(key).or_insert_with(builder))
    }

    pub fn lookup(&self, key: ObjectId) -> Option<&AnimationRecord<V>> {
        self.records.get(&key)
    }

    pub fn lookup_mut(&mut self, key: ObjectId) -> Option<&mut AnimationRecord<V>> {
        self.records.get_mut(&key)
    }

    /// 替换记录，返回旧记录
    ///
    /// 调用方需先取消旧记录的任务。
    pub fn replace(
        &mut self,
        key: ObjectId,
        record: AnimationRecord<V>,
    ) -> Option<AnimationRecord<V>> {
        self.records.insert(key, record)
    }

    pub fn remove(&mut self, key: ObjectId) -> Option<AnimationRecord<V>> {
        self.records.remove(&key)
    }

    pub fn contains(&self, key: ObjectId) -> bool {
        self.records.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 按 `ObjectId` 升序返回所有键
    pub fn keys(&self) -> Vec<ObjectId> {
        self.records.keys().copied().collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut AnimationRecord<V>)> {
        self.records.iter_mut().map(|(key, record)| (*key, record))
    }

    /// 取消所有任务并清空，返回被取消的任务 ID
    pub fn clear(&mut self) -> Vec<TweenId> {
        let mut cancelled = Vec::with_capacity(self.records.len());
        for (_, mut record) in std::mem::take(&mut self.records) {
            record.task.cancel();
            cancelled.push(record.task.id());
        }
        cancelled
    }
}

/// 两个属性域的记录表
#[derive(Debug, Default)]
pub(crate) struct Registries {
    pub colors: AnimationRegistry<Rgba>,
    pub positions: AnimationRegistry<Vec3>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn morph_record(id: u64, from: Vec3, to: Vec3) -> AnimationRecord<Vec3> {
        let task = MorphTask::new(TweenId::new(id), from, to, 1.0, EasingFunction::Linear);
        AnimationRecord::new(TweenTask::Morph(task), from, to, 1.0, EasingFunction::Linear)
    }

    #[test]
    fn test_try_start_only_inserts_once() {
        let mut registry = AnimationRegistry::new();
        let key = ObjectId::new(1);
        let target = Vec3::new(1.0, 0.0, 0.0);

        let record = registry.try_start(key, || morph_record(1, Vec3::zero(), target));
        assert_eq!(record.map(|r| r.task().id()), Some(TweenId::new(1)));

        let mut built = false;
        let second = registry.try_start(key, || {
            built = true;
            morph_record(2, Vec3::zero(), target)
        });
        assert!(second.is_none());
        assert!(!built);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut registry = AnimationRegistry::new();
        let key = ObjectId::new(7);
        registry.replace(key, morph_record(1, Vec3::zero(), Vec3::new(1.0, 0.0, 0.0)));

        let old = registry
            .replace(key, morph_record(2, Vec3::zero(), Vec3::new(2.0, 0.0, 0.0)))
            .unwrap();
        assert_eq!(old.task().id(), TweenId::new(1));
        assert_eq!(registry.lookup(key).unwrap().target(), Vec3::new(2.0, 0.0, 0.0));

        assert!(registry.remove(key).is_some());
        assert!(registry.is_empty());
        assert!(registry.remove(key).is_none());
    }

    #[test]
    fn test_keys_are_ordered() {
        let mut registry = AnimationRegistry::new();
        for id in [3, 1, 2] {
            registry.replace(
                ObjectId::new(id),
                morph_record(id, Vec3::zero(), Vec3::new(1.0, 0.0, 0.0)),
            );
        }
        assert_eq!(
            registry.keys(),
            vec![ObjectId::new(1), ObjectId::new(2), ObjectId::new(3)]
        );
    }

    #[test]
    fn test_clear_cancels_tasks() {
        let mut registry = AnimationRegistry::new();
        registry.replace(
            ObjectId::new(1),
            morph_record(5, Vec3::zero(), Vec3::new(1.0, 0.0, 0.0)),
        );
        assert_eq!(registry.clear(), vec![TweenId::new(5)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_record_accessors() {
        let called = std::rc::Rc::new(std::cell::Cell::new(false));
        let flag = called.clone();
        let mut record = morph_record(1, Vec3::zero(), Vec3::new(1.0, 0.0, 0.0))
            .with_on_complete(Some(Box::new(move || flag.set(true))));
        assert!(record.has_on_complete());
        assert_eq!(record.queued_id(), None);
        assert_eq!(record.active().duration, 1.0);

        let callback = record.take_on_complete().unwrap();
        callback();
        assert!(called.get());
        assert!(!record.has_on_complete());
    }
}
