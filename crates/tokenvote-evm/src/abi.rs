//! Contract ABI definitions using alloy's `sol!` macro.

use alloy::sol;

sol! {
    /// ERC-20 voting token with role-gated minting and vote delegation.
    #[sol(rpc)]
    interface IVoteToken {
        function totalSupply() external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function MINTER_ROLE() external view returns (bytes32);
        function hasRole(bytes32 role, address account) external view returns (bool);
        function mint(address to, uint256 amount) external;
        function delegate(address delegatee) external;
        function getVotes(address account) external view returns (uint256);
    }
}

sol! {
    /// Ballot that weighs votes by the voter's token voting power.
    #[sol(rpc)]
    interface ITokenizedBallot {
        function proposals(uint256 index) external view returns (bytes32 name, uint256 voteCount);
        function vote(uint256 proposal, uint256 amount) external;
    }
}
