use rpr_sys::*;

use crate::{
    backend::{MaterialInputValue, ObjectKind},
    error::{Checked, Result},
    image::Image,
    object::{ObjectHandle, engine_object},
};

/// Node types the material system can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Diffuse,
    Microfacet,
    Reflection,
    Emissive,
    Blend,
    Arithmetic,
    NormalMap,
    ImageTexture,
    CheckerTexture,
    ConstantTexture,
    InputLookup,
}

impl NodeKind {
    pub fn raw(self) -> rpr_material_node_type {
        match self {
            NodeKind::Diffuse => RPR_MATERIAL_NODE::DIFFUSE,
            NodeKind::Microfacet => RPR_MATERIAL_NODE::MICROFACET,
            NodeKind::Reflection => RPR_MATERIAL_NODE::REFLECTION,
            NodeKind::Emissive => RPR_MATERIAL_NODE::EMISSIVE,
            NodeKind::Blend => RPR_MATERIAL_NODE::BLEND,
            NodeKind::Arithmetic => RPR_MATERIAL_NODE::ARITHMETIC,
            NodeKind::NormalMap => RPR_MATERIAL_NODE::NORMAL_MAP,
            NodeKind::ImageTexture => RPR_MATERIAL_NODE::IMAGE_TEXTURE,
            NodeKind::CheckerTexture => RPR_MATERIAL_NODE::CHECKER_TEXTURE,
            NodeKind::ConstantTexture => RPR_MATERIAL_NODE::CONSTANT_TEXTURE,
            NodeKind::InputLookup => RPR_MATERIAL_NODE::INPUT_LOOKUP,
        }
    }
}

/// Input keys. Which ones a node reads depends on its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialInput {
    Color,
    Color0,
    Color1,
    Normal,
    Uv,
    Data,
    Roughness,
    Ior,
    Weight,
    Op,
    Value,
    Scale,
}

impl MaterialInput {
    pub fn raw(self) -> rpr_material_node_input {
        match self {
            MaterialInput::Color => RPR_MATERIAL_INPUT::COLOR,
            MaterialInput::Color0 => RPR_MATERIAL_INPUT::COLOR0,
            MaterialInput::Color1 => RPR_MATERIAL_INPUT::COLOR1,
            MaterialInput::Normal => RPR_MATERIAL_INPUT::NORMAL,
            MaterialInput::Uv => RPR_MATERIAL_INPUT::UV,
            MaterialInput::Data => RPR_MATERIAL_INPUT::DATA,
            MaterialInput::Roughness => RPR_MATERIAL_INPUT::ROUGHNESS,
            MaterialInput::Ior => RPR_MATERIAL_INPUT::IOR,
            MaterialInput::Weight => RPR_MATERIAL_INPUT::WEIGHT,
            MaterialInput::Op => RPR_MATERIAL_INPUT::OP,
            MaterialInput::Value => RPR_MATERIAL_INPUT::VALUE,
            MaterialInput::Scale => RPR_MATERIAL_INPUT::SCALE,
        }
    }
}

/// Component-wise operation of an arithmetic node on `Color0` and `Color1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Average,
    Min,
    Max,
}

impl ArithmeticOp {
    pub fn raw(self) -> u32 {
        match self {
            ArithmeticOp::Add => RPR_MATERIAL_NODE_OP::ADD,
            ArithmeticOp::Sub => RPR_MATERIAL_NODE_OP::SUB,
            ArithmeticOp::Mul => RPR_MATERIAL_NODE_OP::MUL,
            ArithmeticOp::Div => RPR_MATERIAL_NODE_OP::DIV,
            ArithmeticOp::Average => RPR_MATERIAL_NODE_OP::AVERAGE,
            ArithmeticOp::Min => RPR_MATERIAL_NODE_OP::MIN,
            ArithmeticOp::Max => RPR_MATERIAL_NODE_OP::MAX,
        }
    }
}

/// Per-hit value an input lookup node produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupValue {
    Uv,
    Normal,
    Position,
}

impl LookupValue {
    pub fn raw(self) -> u32 {
        match self {
            LookupValue::Uv => RPR_MATERIAL_NODE_LOOKUP::UV,
            LookupValue::Normal => RPR_MATERIAL_NODE_LOOKUP::N,
            LookupValue::Position => RPR_MATERIAL_NODE_LOOKUP::P,
        }
    }
}

pub struct MaterialSystem<'c> {
    handle: ObjectHandle<'c>,
}

engine_object!(MaterialSystem);

impl<'c> MaterialSystem<'c> {
    pub(crate) fn new(handle: ObjectHandle<'c>) -> MaterialSystem<'c> {
        MaterialSystem { handle }
    }

    /// The node belongs to the context, not to this system, and may outlive it.
    pub fn create_node(&self, kind: NodeKind) -> Result<MaterialNode<'c>> {
        let raw = self
            .handle
            .backend()
            .material_system_create_node(self.raw(), kind.raw())
            .checked("rprMaterialSystemCreateNode")?;
        Ok(MaterialNode {
            handle: ObjectHandle::new(self.handle.ctx(), raw, ObjectKind::MaterialNode),
            kind,
        })
    }

    pub fn diffuse(&self, color: [f32; 4]) -> Result<MaterialNode<'c>> {
        let node = self.create_node(NodeKind::Diffuse)?;
        node.set_input_f4(MaterialInput::Color, color)?;
        Ok(node)
    }

    pub fn emissive(&self, color: [f32; 4]) -> Result<MaterialNode<'c>> {
        let node = self.create_node(NodeKind::Emissive)?;
        node.set_input_f4(MaterialInput::Color, color)?;
        Ok(node)
    }

    pub fn image_texture(&self, image: &Image<'_>) -> Result<MaterialNode<'c>> {
        let node = self.create_node(NodeKind::ImageTexture)?;
        node.set_input_image(MaterialInput::Data, image)?;
        Ok(node)
    }

    pub fn lookup(&self, value: LookupValue) -> Result<MaterialNode<'c>> {
        let node = self.create_node(NodeKind::InputLookup)?;
        node.set_input_u(MaterialInput::Value, value.raw())?;
        Ok(node)
    }

    /// Arithmetic node with its operation set; operands are connected by the caller.
    pub fn arithmetic(&self, op: ArithmeticOp) -> Result<MaterialNode<'c>> {
        let node = self.create_node(NodeKind::Arithmetic)?;
        node.set_input_u(MaterialInput::Op, op.raw())?;
        Ok(node)
    }
}

/// A node in the material graph. Connections must stay acyclic.
pub struct MaterialNode<'c> {
    handle: ObjectHandle<'c>,
    kind: NodeKind,
}

engine_object!(MaterialNode);

impl<'c> MaterialNode<'c> {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    fn set_input(&self, input: MaterialInput, value: MaterialInputValue, call: &'static str) -> Result<()> {
        self.handle
            .backend()
            .material_node_set_input(self.raw(), input.raw(), value)
            .checked(call)
    }

    pub fn set_input_f4(&self, input: MaterialInput, value: [f32; 4]) -> Result<()> {
        self.set_input(input, MaterialInputValue::Float4(value), "rprMaterialNodeSetInputFByKey")
    }

    pub fn set_input_u(&self, input: MaterialInput, value: u32) -> Result<()> {
        self.set_input(input, MaterialInputValue::Uint(value), "rprMaterialNodeSetInputUByKey")
    }

    pub fn set_input_node(&self, input: MaterialInput, node: &MaterialNode<'_>) -> Result<()> {
        self.set_input(input, MaterialInputValue::Node(node.raw()), "rprMaterialNodeSetInputNByKey")
    }

    pub fn set_input_image(&self, input: MaterialInput, image: &Image<'_>) -> Result<()> {
        self.set_input(
            input,
            MaterialInputValue::Image(image.raw()),
            "rprMaterialNodeSetInputImageDataByKey",
        )
    }
}
